//! Error Types
//!
//! Centralized error handling for all account operations.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Account and authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("You must confirm your email address before logging in.")]
    EmailNotConfirmed,

    #[error("No token provided")]
    MissingToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has already been used")]
    TokenUsed,

    #[error("Refresh token is required")]
    RefreshTokenRequired,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UnknownUser,

    #[error("Invalid or expired confirmation token.")]
    InvalidConfirmationToken,

    #[error("Invalid or expired confirmation code.")]
    InvalidConfirmationCode,

    #[error("You are not authorized to perform this action.")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Expected request with `Content-Type: application/json`")]
    UnsupportedMediaType,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// HTTP status and machine readable error code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthError::EmailNotConfirmed => (StatusCode::UNAUTHORIZED, "email_not_confirmed"),
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AuthError::TokenUsed => (StatusCode::UNAUTHORIZED, "token_used"),
            AuthError::RefreshTokenRequired | AuthError::InvalidRefreshToken => {
                (StatusCode::UNAUTHORIZED, "invalid_refresh_token")
            }
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "user_not_found"),
            AuthError::InvalidConfirmationToken | AuthError::InvalidConfirmationCode => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_confirmation")
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AuthError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AuthError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AuthError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AuthError::UnsupportedMediaType => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type")
            }
            AuthError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AuthError::Database(_) | AuthError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = match &self {
            AuthError::Database(_) | AuthError::Internal | AuthError::Config(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(serde_json::json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT error: {:?}", err);
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AuthError::UnsupportedMediaType,
            JsonRejection::JsonDataError(err) => AuthError::Validation(err.body_text()),
            other => AuthError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for AuthError {
    fn from(rejection: PathRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

/// Field validation messages, sorted
pub(crate) fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect();
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Email is invalid"))]
        email: String,
        #[validate(length(min = 6, message = "Password is too short (minimum is 6 characters)"))]
        password: String,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidRefreshToken.status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Forbidden.status_and_code().0, StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidConfirmationCode.status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AuthError::NotFound.status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::BadRequest("Invalid URL".into()).status_and_code(),
            (StatusCode::BAD_REQUEST, "bad_request")
        );
        assert_eq!(
            AuthError::UnsupportedMediaType.status_and_code().0,
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let response = AuthError::Database("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_messages_are_sorted() {
        let signup = Signup {
            email: "nope".into(),
            password: "abc".into(),
        };
        let messages = validation_messages(&signup.validate().unwrap_err());
        assert_eq!(
            messages,
            vec![
                "Email is invalid".to_string(),
                "Password is too short (minimum is 6 characters)".to_string(),
            ]
        );
    }
}
