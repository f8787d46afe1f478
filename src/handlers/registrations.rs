//! Sign up and contact confirmation

use super::AppState;
use crate::error::AuthError;
use crate::extractors::JsonBody;
use crate::jobs::Job;
use crate::models::*;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

const SIGNED_UP: &str = "Signed up successfully. Please check your email to confirm your account.";
const PHONE_CODE_SENT: &str = " A confirmation code has been sent to your phone.";

/// POST /api/v1/register
///
/// Create an unconfirmed account and queue the confirmation deliveries
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let (user, roles) = state.auth.register(req.user).await?;

    state.jobs.enqueue(Job::SendEmailConfirmation {
        email: user.email.clone(),
    });

    let mut message = SIGNED_UP.to_string();
    if user.phone.is_some() {
        state.jobs.enqueue(Job::SendPhoneConfirmation {
            email: user.email.clone(),
        });
        message.push_str(PHONE_CODE_SENT);
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": { "code": 200, "message": message },
            "data": UserAttributes::new(&user, &roles),
        })),
    ))
}

/// POST /api/v1/confirm_email
pub async fn confirm_email(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ConfirmEmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.confirm_email(&req.token).await?;

    Ok(Json(MessageResponse::new(
        "Email confirmed successfully. You can now log in.",
    )))
}

/// POST /api/v1/confirm_phone
pub async fn confirm_phone(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ConfirmPhoneRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.confirm_phone(&req.phone, &req.code).await?;

    Ok(Json(MessageResponse::new("Phone number confirmed successfully.")))
}

/// POST /api/v1/send_email_confirmation
///
/// Always succeeds so the response does not reveal which emails exist
pub async fn send_email_confirmation(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> impl IntoResponse {
    state.jobs.enqueue(Job::SendEmailConfirmation { email: req.email });

    Json(MessageResponse::new(
        "If your account exists and is not confirmed, a confirmation email has been sent.",
    ))
}

/// POST /api/v1/send_phone_confirmation
pub async fn send_phone_confirmation(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> impl IntoResponse {
    state.jobs.enqueue(Job::SendPhoneConfirmation { email: req.email });

    Json(MessageResponse::new(
        "If your account has a phone number, a confirmation code has been sent.",
    ))
}
