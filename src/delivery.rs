//! Token Delivery
//!
//! Decides whether tokens travel as cookies (web clients) or only in JSON
//! bodies and headers (mobile clients), and where incoming tokens are read
//! from.

use crate::config::AuthConfig;
use crate::models::TokenPair;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "jwt_token";

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Header a native app uses to announce itself
pub const CLIENT_TYPE_HEADER: &str = "x-client-type";

/// Kind of client making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Web,
    Mobile,
}

impl ClientKind {
    /// `X-Client-Type: mobile` (case and whitespace insensitive) marks a
    /// mobile client; anything else is treated as a browser.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_mobile = headers
            .get(CLIENT_TYPE_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|v| v.trim().eq_ignore_ascii_case("mobile"))
            .unwrap_or(false);

        if is_mobile {
            tracing::debug!("Mobile client detected via X-Client-Type header");
            ClientKind::Mobile
        } else {
            ClientKind::Web
        }
    }

    /// Web clients receive tokens as HttpOnly cookies
    pub fn uses_cookies(&self) -> bool {
        matches!(self, ClientKind::Web)
    }
}

fn auth_cookie(
    name: &'static str,
    value: String,
    max_age: i64,
    config: &AuthConfig,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(CookieDuration::seconds(max_age));

    if let Some(domain) = config.effective_cookie_domain() {
        builder = builder.domain(domain.to_string());
    }

    builder.build()
}

/// Add the access and refresh cookies for a freshly issued pair
pub fn set_auth_cookies(jar: CookieJar, config: &AuthConfig, pair: &TokenPair) -> CookieJar {
    jar.add(auth_cookie(
        ACCESS_COOKIE,
        pair.access_token.clone(),
        config.access_token_expiration,
        config,
    ))
    .add(auth_cookie(
        REFRESH_COOKIE,
        pair.refresh_token.clone(),
        config.refresh_token_expiration,
        config,
    ))
}

/// Overwrite both auth cookies with expired, empty ones
///
/// Removal cookies are always emitted, even when the request did not carry
/// the cookies, so a client holding stale cookies from elsewhere is cleared.
pub fn clear_auth_cookies(jar: CookieJar, config: &AuthConfig) -> CookieJar {
    [ACCESS_COOKIE, REFRESH_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            let mut cookie = auth_cookie(name, String::new(), 0, config);
            cookie.make_removal();
            jar.add(cookie)
        })
}

/// Access token from `Authorization` (last space separated segment), then
/// from the access cookie
pub fn access_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(' ').last())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    from_header.or_else(|| {
        jar.get(ACCESS_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Refresh token from the refresh cookie, then from the request body
pub fn refresh_token(jar: &CookieJar, body: Option<&str>) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| body.map(String::from))
}
