use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Secret used by the development preset. Refused in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-secret-change-me";

/// Longest accepted token lifetime: five years
pub const MAX_JWT_EXPIRY_MINUTES: u64 = 5 * 365 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" | "stage" => Ok(Environment::Staging),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL, e.g. `sqlite::memory:` or `sqlite://users.db`
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    /// Upper bound for the `limit` query parameter on user listings
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_minutes: u64,
    pub cors_origins: Vec<String>,
    pub argon2_memory_cost_kib: u32,
    pub argon2_time_cost: u32,
    pub argon2_parallelism: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("JWT secret is not configured")]
    MissingJwtSecret,

    #[error("Refusing to run {0:?} with the development JWT secret")]
    InsecureJwtSecret(Environment),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Development);

        Self::from_env_for(environment)
    }

    /// Preset for `environment` with env var overrides applied
    pub fn from_env_for(environment: Environment) -> Self {
        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = lookup("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_JWT_SECRET").or_else(|| lookup("JWT_SECRET")) {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_ARGON2_MEMORY_COST_KIB") {
            self.security.argon2_memory_cost_kib = v.parse().unwrap_or(self.security.argon2_memory_cost_kib);
        }
        if let Some(v) = lookup("SECURITY_ARGON2_TIME_COST") {
            self.security.argon2_time_cost = v.parse().unwrap_or(self.security.argon2_time_cost);
        }
        if let Some(v) = lookup("SECURITY_ARGON2_PARALLELISM") {
            self.security.argon2_parallelism = v.parse().unwrap_or(self.security.argon2_parallelism);
        }

        self
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.environment == Environment::Production
            && self.security.jwt_secret == DEVELOPMENT_JWT_SECRET
        {
            return Err(ConfigError::InsecureJwtSecret(self.environment));
        }
        if self.security.jwt_expiry_minutes == 0 {
            return Err(ConfigError::Invalid {
                name: "SECURITY_JWT_EXPIRY_MINUTES",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.security.jwt_expiry_minutes > MAX_JWT_EXPIRY_MINUTES {
            return Err(ConfigError::Invalid {
                name: "SECURITY_JWT_EXPIRY_MINUTES",
                reason: format!("must be at most {MAX_JWT_EXPIRY_MINUTES}"),
            });
        }
        if self.api.max_page_size <= 0 {
            return Err(ConfigError::Invalid {
                name: "API_MAX_PAGE_SIZE",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: true,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_minutes: 30,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                argon2_memory_cost_kib: 8192,
                argon2_time_cost: 3,
                argon2_parallelism: 1,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "sqlite://users.db".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: true,
                max_page_size: 500,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_minutes: 30,
                cors_origins: vec!["https://staging.example.com".to_string()],
                argon2_memory_cost_kib: 19456,
                argon2_time_cost: 2,
                argon2_parallelism: 1,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "sqlite://users.db".to_string(),
                max_connections: 20,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: false,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_minutes: 15,
                cors_origins: vec!["https://app.example.com".to_string()],
                argon2_memory_cost_kib: 19456,
                argon2_time_cost: 2,
                argon2_parallelism: 1,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.security.jwt_expiry_minutes, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = AppConfig::production();
        assert!(matches!(config.validate(), Err(ConfigError::MissingJwtSecret)));

        config.security.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InsecureJwtSecret(Environment::Production))
        ));

        config.security.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Staging".parse::<Environment>().unwrap(), Environment::Staging);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let mut config = AppConfig::development();
        config.security.jwt_expiry_minutes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_oversized_expiry_rejected() {
        let mut config = AppConfig::development();
        config.security.jwt_expiry_minutes = u64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        config.security.jwt_expiry_minutes = 1 << 62;
        assert!(config.validate().is_err());

        config.security.jwt_expiry_minutes = MAX_JWT_EXPIRY_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_applied() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite://override.db"),
            ("PORT", "9100"),
            ("API_MAX_PAGE_SIZE", "not-a-number"),
            ("JWT_SECRET", "from-fallback"),
            ("SECURITY_JWT_EXPIRY_MINUTES", "45"),
            ("SECURITY_CORS_ORIGINS", " https://a.example.com ,,https://b.example.com, "),
        ]);

        let config = AppConfig::development()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.database.url, "sqlite://override.db");
        assert_eq!(config.api.port, 9100);
        // Unparseable values keep the preset
        assert_eq!(config.api.max_page_size, 1000);
        assert_eq!(config.security.jwt_secret, "from-fallback");
        assert_eq!(config.security.jwt_expiry_minutes, 45);
        assert_eq!(
            config.security.cors_origins,
            vec!["https://a.example.com".to_string(), "https://b.example.com".to_string()]
        );
    }

    #[test]
    fn test_primary_names_win_over_fallbacks() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("API_PORT", "9200"),
            ("PORT", "9300"),
            ("SECURITY_JWT_SECRET", "primary"),
            ("JWT_SECRET", "fallback"),
        ]);

        let config = AppConfig::production()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9200);
        assert_eq!(config.security.jwt_secret, "primary");
    }
}
