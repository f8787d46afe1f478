//! Service Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;

/// Upper bound for every configured lifetime, in seconds (ten years)
pub const MAX_EXPIRATION_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Access token lifetime in seconds (from JWT_ACCESS_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// Refresh token lifetime in seconds (from JWT_REFRESH_EXPIRATION env var)
    pub refresh_token_expiration: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Password reset token lifetime in seconds (from PASSWORD_RESET_EXPIRATION env var)
    pub password_reset_expiration: i64,

    /// Email confirmation token lifetime in seconds (from EMAIL_CONFIRMATION_EXPIRATION env var)
    pub email_confirmation_expiration: i64,

    /// Phone confirmation code lifetime in seconds (from PHONE_CODE_EXPIRATION env var)
    pub phone_code_expiration: i64,

    /// Minimum password length (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,

    /// Mark auth cookies `Secure` (from COOKIE_SECURE env var)
    pub cookie_secure: bool,

    /// Cookie domain, only applied to secure cookies (from COOKIE_DOMAIN env var)
    pub cookie_domain: Option<String>,

    /// Base URL used in confirmation and reset links (from PUBLIC_URL env var)
    pub public_url: String,
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// A missing `JWT_SECRET` yields an empty secret, which `validate` rejects.
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),

            // 24 hours
            access_token_expiration: env_parse("JWT_ACCESS_EXPIRATION").unwrap_or(86400),

            // 7 days
            refresh_token_expiration: env_parse("JWT_REFRESH_EXPIRATION").unwrap_or(604800),

            jwt_issuer: env_string("JWT_ISSUER").unwrap_or_else(|| "account-api".to_string()),

            jwt_audience: env_string("JWT_AUDIENCE")
                .unwrap_or_else(|| "account-api-clients".to_string()),

            // 19 MiB
            argon2_memory_cost: env_parse("ARGON2_MEMORY_COST").unwrap_or(19456),

            argon2_time_cost: env_parse("ARGON2_TIME_COST").unwrap_or(2),

            argon2_parallelism: env_parse("ARGON2_PARALLELISM").unwrap_or(1),

            // 1 hour
            password_reset_expiration: env_parse("PASSWORD_RESET_EXPIRATION").unwrap_or(3600),

            email_confirmation_expiration: env_parse("EMAIL_CONFIRMATION_EXPIRATION")
                .unwrap_or(86400),

            phone_code_expiration: env_parse("PHONE_CODE_EXPIRATION").unwrap_or(600), // 10 minutes

            min_password_length: env_parse("MIN_PASSWORD_LENGTH").unwrap_or(6),

            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(false),

            cookie_domain: env_string("COOKIE_DOMAIN"),

            public_url: env_string("PUBLIC_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(
                "JWT_ACCESS_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(AuthError::Config(
                "JWT_REFRESH_EXPIRATION must be greater than JWT_ACCESS_EXPIRATION".to_string(),
            ));
        }

        if self.password_reset_expiration <= 0
            || self.email_confirmation_expiration <= 0
            || self.phone_code_expiration <= 0
        {
            return Err(AuthError::Config(
                "Confirmation and reset expirations must be positive".to_string(),
            ));
        }

        let lifetimes = [
            ("JWT_ACCESS_EXPIRATION", self.access_token_expiration),
            ("JWT_REFRESH_EXPIRATION", self.refresh_token_expiration),
            ("PASSWORD_RESET_EXPIRATION", self.password_reset_expiration),
            ("EMAIL_CONFIRMATION_EXPIRATION", self.email_confirmation_expiration),
            ("PHONE_CODE_EXPIRATION", self.phone_code_expiration),
        ];
        if let Some((name, _)) = lifetimes
            .iter()
            .find(|(_, seconds)| *seconds > MAX_EXPIRATION_SECONDS)
        {
            return Err(AuthError::Config(format!(
                "{name} must not exceed {MAX_EXPIRATION_SECONDS} seconds"
            )));
        }

        if self.min_password_length < 6 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 6".to_string(),
            ));
        }

        Ok(())
    }

    /// Cookie domain to emit, if any
    ///
    /// The domain is only attached to secure cookies so local development
    /// over plain HTTP keeps host-only cookies.
    pub fn effective_cookie_domain(&self) -> Option<&str> {
        if self.cookie_secure {
            self.cookie_domain.as_deref()
        } else {
            None
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection string (from DATABASE_URL env var)
    pub database_url: String,

    /// Listen address (from BIND_ADDR env var)
    pub bind_addr: String,

    /// Maximum pool connections (from DATABASE_MAX_CONNECTIONS env var)
    pub max_connections: u32,

    /// Allowed CORS origins, comma separated (from CORS_ORIGINS env var)
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AuthError> {
        let database_url = env_string("DATABASE_URL")
            .ok_or_else(|| AuthError::Config("DATABASE_URL must be set".to_string()))?;

        let cors_origins = env_string("CORS_ORIGINS")
            .map(|origins| parse_origins(&origins))
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:3001".to_string(),
                    "http://localhost:5173".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                    "http://127.0.0.1:3001".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ]
            });

        Ok(Self {
            database_url,
            bind_addr: env_string("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(5),
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env_string(key).and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "a".repeat(32),
        access_token_expiration: 86400,
        refresh_token_expiration: 604800,
        jwt_issuer: "test".to_string(),
        jwt_audience: "test".to_string(),
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        password_reset_expiration: 3600,
        email_confirmation_expiration: 86400,
        phone_code_expiration: 600,
        min_password_length: 6,
        cookie_secure: false,
        cookie_domain: None,
        public_url: "http://localhost:3000".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let config = AuthConfig {
            refresh_token_expiration: 60,
            access_token_expiration: 60,
            ..test_config()
        };

        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_lifetimes_are_capped() {
        let config = AuthConfig {
            access_token_expiration: 10_000_000_000_000,
            refresh_token_expiration: 20_000_000_000_000,
            ..test_config()
        };
        assert_eq!(
            config.validate(),
            Err(AuthError::Config(format!(
                "JWT_ACCESS_EXPIRATION must not exceed {MAX_EXPIRATION_SECONDS} seconds"
            )))
        );

        let config = AuthConfig {
            password_reset_expiration: MAX_EXPIRATION_SECONDS + 1,
            ..test_config()
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));

        let config = AuthConfig {
            refresh_token_expiration: MAX_EXPIRATION_SECONDS,
            ..test_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cookie_domain_only_for_secure_cookies() {
        let mut config = AuthConfig {
            cookie_domain: Some("example.com".to_string()),
            ..test_config()
        };
        assert_eq!(config.effective_cookie_domain(), None);

        config.cookie_secure = true;
        assert_eq!(config.effective_cookie_domain(), Some("example.com"));
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" https://app.example.com/, ,http://localhost:5173");
        assert_eq!(
            origins,
            vec!["https://app.example.com", "http://localhost:5173"]
        );
    }
}
