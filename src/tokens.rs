//! Token Primitives
//!
//! Access token signing/verification and the opaque single-use credentials
//! (refresh tokens, reset tokens, confirmation tokens and phone codes).
//! Opaque values are handed to clients once; only their SHA-256 digests
//! are stored.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::AccessTokenClaims;

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Random bytes behind every opaque token
const OPAQUE_TOKEN_BYTES: usize = 32;

/// Number of digits in a phone confirmation code
const PHONE_CODE_DIGITS: u32 = 6;

/// Signs and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl_seconds: i64,
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl_seconds: config.access_token_expiration,
        }
    }

    /// Issue an access token for a user, valid from `now`
    pub fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AccessTokenClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: shift(now, self.ttl_seconds)?.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify signature, expiry, issuer and audience
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

/// `from` moved by a signed number of seconds
///
/// Out of range lifetimes surface as `AuthError::Internal` instead of a panic.
pub fn shift(from: DateTime<Utc>, seconds: i64) -> Result<DateTime<Utc>, AuthError> {
    Duration::try_seconds(seconds)
        .and_then(|offset| from.checked_add_signed(offset))
        .ok_or_else(|| {
            tracing::error!(seconds, "Lifetime out of range");
            AuthError::Internal
        })
}

/// Generate a URL-safe opaque token
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Generate a zero padded numeric phone confirmation code
pub fn generate_phone_code() -> String {
    let upper = 10u32.pow(PHONE_CODE_DIGITS);
    let code = OsRng.gen_range(0..upper);
    format!("{:0width$}", code, width = PHONE_CODE_DIGITS as usize)
}

/// Digest used to store and look up opaque tokens
pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
