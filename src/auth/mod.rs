use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_JWT_EXPIRY_MINUTES;

pub mod password;

pub use password::{hash_password, verify_password, DummyHash, PasswordError, PasswordParams};

/// Claims carried by access tokens issued from `/token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated user
    pub sub: String,
    /// Store id of the authenticated user
    pub uid: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Lifetimes above `MAX_JWT_EXPIRY_MINUTES` are clamped to it.
    pub fn new(username: impl Into<String>, user_id: i64, expiry_minutes: u64) -> Self {
        let now = Utc::now();
        let minutes = i64::try_from(expiry_minutes.min(MAX_JWT_EXPIRY_MINUTES)).unwrap_or(0);
        let exp = (now + Duration::minutes(minutes)).timestamp();

        Self {
            sub: username.into(),
            uid: user_id,
            exp,
            iat: now.timestamp(),
        }
    }

    /// Seconds between issue and expiry
    pub fn lifetime_secs(&self) -> u64 {
        u64::try_from(self.exp - self.iat).unwrap_or(0)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the decoded claims.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
