//! Request Extractors
//!
//! Axum extractors for the authenticated user and request metadata.

use crate::delivery::{self, ClientKind};
use crate::error::AuthError;
use crate::handlers::AppState;
use crate::models::{AccessTokenClaims, Role, User};
use crate::roles;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

/// JSON body; malformed payloads answer with the usual error document
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct JsonBody<T>(pub T);

/// Path parameters; unparsable segments answer with the usual error document
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AuthError))]
pub struct PathParam<T>(pub T);

/// The user behind a valid access token, with their roles loaded
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Claims are already there when `require_auth` ran
        let claims = match parts.extensions.get::<AccessTokenClaims>() {
            Some(claims) => claims.clone(),
            None => {
                let jar = CookieJar::from_headers(&parts.headers);
                let token =
                    delivery::access_token(&parts.headers, &jar).ok_or(AuthError::MissingToken)?;
                state.auth.validate_access_token(&token)?
            }
        };

        let user = state
            .auth
            .get_user(claims.sub)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        let roles = roles::fetch_roles(state.auth.db(), user.id).await?;

        Ok(CurrentUser { user, roles })
    }
}

/// Client information (IP, user agent, web or mobile)
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub kind: ClientKind,
}

impl ClientInfo {
    pub fn from_parts(parts: &Parts) -> Self {
        let ip = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get("X-Real-IP")
                    .and_then(|h| h.to_str().ok())
                    .map(String::from)
            });

        let user_agent = parts
            .headers
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        ClientInfo {
            ip,
            user_agent,
            kind: ClientKind::from_headers(&parts.headers),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_client_info_prefers_forwarded_for() {
        let parts = parts(
            Request::builder()
                .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
                .header("X-Real-IP", "10.0.0.2")
                .header("User-Agent", "curl/8.0")
                .header("X-Client-Type", "mobile"),
        );

        let info = ClientInfo::from_parts(&parts);
        assert_eq!(info.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(info.kind, ClientKind::Mobile);
    }

    #[test]
    fn test_client_info_defaults() {
        let request = Request::builder().header("X-Real-IP", "10.0.0.2");
        let info = ClientInfo::from_parts(&parts(request));
        assert_eq!(info.ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(info.user_agent, None);
        assert_eq!(info.kind, ClientKind::Web);
    }

    #[test]
    fn test_admin_check() {
        let mut current = CurrentUser {
            user: crate::models::sample_user(),
            roles: vec![Role::User],
        };
        assert!(!current.is_admin());
        current.roles.push(Role::Admin);
        assert!(current.is_admin());
    }
}
