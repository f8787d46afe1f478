//! Out-of-band Delivery
//!
//! Confirmation emails, password reset emails and phone codes leave the
//! system through a `Notifier`. The bundled `LogNotifier` writes them to the
//! log, which is what development and tests use.

use crate::error::AuthError;
use crate::models::User;

use async_trait::async_trait;

/// Link a user follows to confirm their email address
pub fn email_confirmation_link(public_url: &str, token: &str) -> String {
    format!(
        "{}/api/v1/confirm_email?token={}",
        public_url.trim_end_matches('/'),
        token
    )
}

/// Link a user follows to choose a new password
pub fn password_reset_link(public_url: &str, token: &str) -> String {
    format!(
        "{}/api/v1/password/reset/{}",
        public_url.trim_end_matches('/'),
        token
    )
}

/// Delivery channel for account messages
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn email_confirmation(&self, user: &User, link: &str) -> Result<(), AuthError>;

    async fn password_reset(&self, user: &User, link: &str) -> Result<(), AuthError>;

    async fn phone_code(&self, user: &User, phone: &str, code: &str) -> Result<(), AuthError>;
}

/// Writes every message to the log instead of sending it
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn email_confirmation(&self, user: &User, link: &str) -> Result<(), AuthError> {
        tracing::info!(user_id = %user.id, email = %user.email, %link, "Email confirmation");
        Ok(())
    }

    async fn password_reset(&self, user: &User, link: &str) -> Result<(), AuthError> {
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            %link,
            "Password reset instructions"
        );
        Ok(())
    }

    async fn phone_code(&self, user: &User, phone: &str, code: &str) -> Result<(), AuthError> {
        tracing::info!(user_id = %user.id, %phone, %code, "Phone confirmation code");
        Ok(())
    }
}
