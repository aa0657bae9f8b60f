use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Fallback secrets for local work only; production refuses to start with them
pub const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-me";
pub const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-me";

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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    /// Used when the URI carries no default database
    pub name: String,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    /// Upper bound on concurrent refresh tokens kept per user
    pub max_sessions: usize,
}

impl SecurityConfig {
    pub fn uses_default_secrets(&self) -> bool {
        self.access_token_secret == DEV_ACCESS_SECRET
            || self.refresh_token_secret == DEV_REFRESH_SECRET
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Rejects settings the server must not run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_production() && self.security.uses_default_secrets() {
            anyhow::bail!(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must be set in production"
            );
        }
        Ok(())
    }

    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("MONGODB_URI") {
            self.database.uri = v;
        }
        if let Ok(v) = env::var("MONGODB_DATABASE") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_SECRET") {
            self.security.access_token_secret = v;
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_SECRET") {
            self.security.refresh_token_secret = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_TTL_MINUTES") {
            self.security.access_token_ttl_minutes =
                v.parse().unwrap_or(self.security.access_token_ttl_minutes);
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_TTL_DAYS") {
            self.security.refresh_token_ttl_days =
                v.parse().unwrap_or(self.security.refresh_token_ttl_days);
        }
        if let Ok(v) = env::var("SECURITY_MAX_SESSIONS") {
            self.security.max_sessions = v.parse().unwrap_or(self.security.max_sessions);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017/assignment2".to_string(),
                name: "assignment2".to_string(),
                connection_timeout_secs: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                access_token_secret: DEV_ACCESS_SECRET.to_string(),
                refresh_token_secret: DEV_REFRESH_SECRET.to_string(),
                access_token_ttl_minutes: 60,
                refresh_token_ttl_days: 7,
                max_sessions: 10,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017/assignment2".to_string(),
                name: "assignment2".to_string(),
                connection_timeout_secs: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                access_token_secret: DEV_ACCESS_SECRET.to_string(),
                refresh_token_secret: DEV_REFRESH_SECRET.to_string(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 7,
                max_sessions: 10,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017/assignment2".to_string(),
                name: "assignment2".to_string(),
                connection_timeout_secs: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                access_token_secret: DEV_ACCESS_SECRET.to_string(),
                refresh_token_secret: DEV_REFRESH_SECRET.to_string(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 7,
                max_sessions: 5,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database.uri, "mongodb://localhost:27017/assignment2");
        assert!(config.security.uses_default_secrets());
        assert!(config.security.access_token_ttl_minutes < config.security.refresh_token_ttl_days * 24 * 60);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.security.max_sessions, 5);
        assert_eq!(config.security.access_token_ttl_minutes, 15);
    }

    #[test]
    fn test_custom_secrets_are_not_defaults() {
        let mut security = AppConfig::development().security;
        security.access_token_secret = "a".repeat(32);
        security.refresh_token_secret = "b".repeat(32);
        assert!(!security.uses_default_secrets());
    }

    #[test]
    fn test_production_rejects_default_secrets() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        let mut config = AppConfig::production();
        config.security.access_token_secret = "a".repeat(32);
        assert!(config.validate().is_err());

        config.security.refresh_token_secret = "b".repeat(32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_allows_default_secrets() {
        assert!(AppConfig::development().validate().is_ok());
        assert!(AppConfig::staging().validate().is_ok());
    }
}
