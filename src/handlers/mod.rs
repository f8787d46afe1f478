//! HTTP Handlers
//!
//! Route table and shared state for the `/api/v1` API.

pub mod auth;
pub mod passwords;
pub mod registrations;
pub mod users;

use crate::jobs::JobQueue;
use crate::middleware;
use crate::service::AuthService;
use crate::users::UserService;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub jobs: JobQueue,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, jobs: JobQueue) -> Self {
        let users = Arc::new(UserService::new(
            auth.db().clone(),
            auth.passwords().clone(),
        ));
        Self { auth, users, jobs }
    }
}

// ============================================
// Route Builder
// ============================================

/// Create the application routes
pub fn create_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/register", post(registrations::create))
        .route("/confirm_email", post(registrations::confirm_email))
        .route("/confirm_phone", post(registrations::confirm_phone))
        .route(
            "/send_email_confirmation",
            post(registrations::send_email_confirmation),
        )
        .route(
            "/send_phone_confirmation",
            post(registrations::send_phone_confirmation),
        )
        .route("/password/reset", post(passwords::create))
        .route("/password/reset/:token", put(passwords::update));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/logout", delete(auth::logout))
        .route("/users", get(users::index))
        .route("/users/me", get(users::me))
        .route(
            "/users/:id",
            get(users::show)
                .patch(users::update)
                .put(users::update)
                .delete(users::destroy),
        )
        .route("/users/:id/password", patch(users::update_password))
        .route("/users/:id/roles", post(users::add_role))
        .route("/users/:id/roles/:role", delete(users::remove_role))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .route("/up", get(health))
        .with_state(state)
}

/// GET /up
pub async fn health() -> StatusCode {
    StatusCode::OK
}
