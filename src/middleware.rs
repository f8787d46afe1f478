//! Authentication Middleware
//!
//! Access token validation for protected routes.

use crate::delivery;
use crate::error::AuthError;
use crate::handlers::AppState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

/// Require a valid access token
///
/// The token is read from the `Authorization` header or the access cookie.
/// Its claims are stored in request extensions for `CurrentUser`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = delivery::access_token(req.headers(), &jar).ok_or(AuthError::MissingToken)?;

    let claims = state.auth.validate_access_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        e
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
