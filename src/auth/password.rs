use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::{sync::OnceCell, task};

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid Argon2 params: {0}")]
    InvalidParams(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid password hash format: {0}")]
    MalformedHash(String),

    #[error("Password task failed: {0}")]
    Task(#[from] task::JoinError),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy)]
pub struct PasswordParams {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl From<&SecurityConfig> for PasswordParams {
    fn from(cfg: &SecurityConfig) -> Self {
        Self {
            memory_cost_kib: cfg.argon2_memory_cost_kib,
            time_cost: cfg.argon2_time_cost,
            parallelism: cfg.argon2_parallelism,
        }
    }
}

fn hash_blocking(password: &str, params: PasswordParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(params.memory_cost_kib, params.time_cost, params.parallelism, None)
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

fn verify_blocking(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    // Cost parameters are read back from the PHC string
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password with Argon2id on the blocking pool.
pub async fn hash_password(password: &str, params: PasswordParams) -> Result<String, PasswordError> {
    let password = password.to_string();
    task::spawn_blocking(move || hash_blocking(&password, params)).await?
}

/// Check a password against a stored PHC hash on the blocking pool.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || verify_blocking(&password, &password_hash)).await?
}

/// Stand-in hash verified on logins that name an unknown user.
///
/// Hashed lazily with the configured params on first use and shared by clones.
#[derive(Debug, Clone, Default)]
pub struct DummyHash(Arc<OnceCell<String>>);

impl DummyHash {
    const PASSWORD: &'static str = "dummy-password-never-issued";

    pub async fn verify(&self, password: &str, params: PasswordParams) -> Result<bool, PasswordError> {
        let hash = self
            .0
            .get_or_try_init(|| hash_password(Self::PASSWORD, params))
            .await?;
        verify_password(password, hash).await
    }
}
