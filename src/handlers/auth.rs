//! Login, token refresh and logout

use super::AppState;
use crate::delivery;
use crate::error::AuthError;
use crate::extractors::{ClientInfo, CurrentUser, JsonBody};
use crate::models::*;

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;

/// POST /api/v1/login
///
/// Check credentials and issue an access/refresh pair. Web clients also get
/// both tokens as cookies.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let (user, pair) = state.auth.login(req, &client).await?;

    let jar = if client.kind.uses_cookies() {
        delivery::set_auth_cookies(jar, state.auth.config(), &pair)
    } else {
        jar
    };

    Ok((
        jar,
        Json(LoginResponse {
            token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: AuthUserSummary {
                id: user.id,
                email: user.email,
            },
            message: "Successfully authenticated".to_string(),
        }),
    ))
}

/// POST /api/v1/refresh
///
/// Rotate the refresh token. The cookie wins over the body; mobile clients
/// receive the new refresh token in the body since they have no cookies.
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    body: Option<JsonBody<RefreshTokenRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let from_body = body.and_then(|JsonBody(req)| req.refresh_token);
    let presented = delivery::refresh_token(&jar, from_body.as_deref());

    let pair = state
        .auth
        .refresh_tokens(presented.as_deref(), &client)
        .await?;

    let (jar, refresh_token) = if client.kind.uses_cookies() {
        (delivery::set_auth_cookies(jar, state.auth.config(), &pair), None)
    } else {
        (jar, Some(pair.refresh_token))
    };

    Ok((
        jar,
        Json(RefreshResponse {
            token: pair.access_token,
            refresh_token,
        }),
    ))
}

/// DELETE /api/v1/logout
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
    client: ClientInfo,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.logout(current.user.id).await?;

    let jar = if client.kind.uses_cookies() {
        delivery::clear_auth_cookies(jar, state.auth.config())
    } else {
        jar
    };

    Ok((jar, Json(MessageResponse::new("Successfully logged out"))))
}
