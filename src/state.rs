use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::{DummyHash, PasswordParams};
use crate::config::AppConfig;
use crate::database::UserRepository;

/// Shared handler state: the user store and the configuration it was built with
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub users: UserRepository,
    pub config: Arc<AppConfig>,
    pub dummy_hash: DummyHash,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
            config: Arc::new(config),
            dummy_hash: DummyHash::default(),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.security.jwt_secret
    }

    pub fn password_params(&self) -> PasswordParams {
        PasswordParams::from(&self.config.security)
    }
}
