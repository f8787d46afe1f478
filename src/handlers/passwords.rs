//! Password reset

use super::AppState;
use crate::error::AuthError;
use crate::extractors::{JsonBody, PathParam};
use crate::jobs::Job;
use crate::models::*;

use axum::{extract::State, response::IntoResponse, Json};

/// POST /api/v1/password/reset
///
/// Queue reset instructions; the answer is the same for unknown emails
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> impl IntoResponse {
    state.jobs.enqueue(Job::SendPasswordReset { email: req.email });

    Json(MessageResponse::new(
        "Password reset instructions sent (if user with that email exists).",
    ))
}

/// PUT /api/v1/password/reset/:token
pub async fn update(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
    JsonBody(req): JsonBody<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.reset_password(&token, &req.password).await?;

    Ok(Json(MessageResponse::new("Password has been reset.")))
}
