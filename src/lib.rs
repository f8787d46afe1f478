//! Account API
//!
//! Account backend providing:
//! - User registration with email and phone confirmation
//! - Login with short-lived JWT access tokens
//! - Opaque refresh tokens, rotated on every use, with reuse detection
//! - Cookie delivery for browsers, body/header delivery for mobile apps
//! - Password reset through single-use tokens
//! - Role based authorization for user management
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Access token expiration in seconds (default: 86400)
//! - `JWT_REFRESH_EXPIRATION` - Refresh token expiration in seconds (default: 604800)
//! - `JWT_ISSUER` - JWT issuer claim (default: "account-api")
//! - `JWT_AUDIENCE` - JWT audience claim (default: "account-api-clients")
//! - `COOKIE_SECURE` / `COOKIE_DOMAIN` - Auth cookie attributes
//! - `PUBLIC_URL` - Base URL for confirmation and reset links
//! - `DATABASE_URL` - PostgreSQL connection string (required)
//! - `BIND_ADDR` - Listen address (default: "0.0.0.0:3000")
//! - `CORS_ORIGINS` - Comma separated list of allowed origins
//!
//! # Usage
//!
//! ```rust,ignore
//! use account_api::{build_app, AppState, AuthService, JobQueue};
//!
//! let auth = Arc::new(AuthService::new(pool, AuthConfig::from_env())?);
//! let (jobs, receiver) = JobQueue::new();
//! JobWorker::new(auth.clone(), Arc::new(LogNotifier)).spawn(receiver);
//!
//! let app = build_app(AppState::new(auth, jobs), &server_config.cors_origins);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod notifier;
pub mod password;
pub mod policy;
pub mod roles;
pub mod service;
pub mod tokens;
pub mod users;

// Re-export commonly used types
pub use config::{AuthConfig, ServerConfig};
pub use delivery::ClientKind;
pub use error::AuthError;
pub use extractors::{ClientInfo, CurrentUser};
pub use handlers::AppState;
pub use jobs::{Job, JobQueue, JobWorker};
pub use models::*;
pub use notifier::{LogNotifier, Notifier};
pub use policy::{UserPolicy, UserScope};
pub use service::AuthService;
pub use users::UserService;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Build the full application router with CORS and request tracing
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    handlers::create_routes(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origins, with credentials so cookies flow
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(delivery::CLIENT_TYPE_HEADER),
        ])
        .expose_headers([header::AUTHORIZATION])
        .allow_credentials(true)
}
