//! Password Hashing
//!
//! Argon2id hashing with parameters taken from configuration.

use crate::config::AuthConfig;
use crate::error::AuthError;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id hasher plus the minimum length policy
#[derive(Clone)]
pub struct Passwords {
    params: Params,
    min_length: usize,
}

impl Passwords {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            params,
            min_length: config.min_password_length,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// The parameters embedded in the hash are used, so hashes created
    /// under older settings keep verifying.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::Internal)?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Reject blank or short passwords
    pub fn validate(&self, password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("Password can't be blank".to_string()));
        }

        if password.chars().count() < self.min_length {
            return Err(AuthError::Validation(format!(
                "Password is too short (minimum is {} characters)",
                self.min_length
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_hash_and_verify() {
        let passwords = Passwords::new(&test_config()).unwrap();
        let hash = passwords.hash("s3cret-pass").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("s3cret-pass", &hash).unwrap());
        assert!(!passwords.verify("wrong-pass", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salt() {
        let passwords = Passwords::new(&test_config()).unwrap();
        assert_ne!(
            passwords.hash("password1").unwrap(),
            passwords.hash("password1").unwrap()
        );
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        let passwords = Passwords::new(&test_config()).unwrap();
        assert_eq!(
            passwords.verify("password1", "not-a-hash").unwrap_err(),
            AuthError::Internal
        );
    }

    #[test]
    fn test_length_policy() {
        let passwords = Passwords::new(&test_config()).unwrap();
        assert!(passwords.validate("abcdef").is_ok());
        assert!(matches!(passwords.validate("abc"), Err(AuthError::Validation(_))));
        assert_eq!(
            passwords.validate(""),
            Err(AuthError::Validation("Password can't be blank".to_string()))
        );
    }
}
