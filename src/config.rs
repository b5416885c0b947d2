use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

use crate::wallet::RetryPolicy;

/// Environment variable overriding `database.url`
pub const ENV_WALLET_DB: &str = "PG_WALLET";

/// Time a request deadline must leave for the attempts themselves on top of
/// the full retry backoff
pub const RETRY_DEADLINE_HEADROOM: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Reported to PostgreSQL as `application_name`
    #[serde(default = "default_app")]
    pub app: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline for wallet operations; 0 disables it
    #[serde(default)]
    pub request_timeout_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool acquire timeout
    pub connect_timeout_ms: u64,
    pub min_connections: u32,
    pub max_connections: u32,
    /// 0 keeps idle connections forever
    pub idle_timeout_ms: u64,
    /// Disable prepared statement caching for transaction-mode poolers
    pub use_pgbouncer: bool,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_ms: 5000,
            min_connections: 0,
            max_connections: 10,
            idle_timeout_ms: 600_000,
            use_pgbouncer: false,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

fn default_app() -> String {
    "wallet-api".to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    10_000
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply the `PG_WALLET` override and validate
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;

        if let Ok(url) = std::env::var(ENV_WALLET_DB) {
            tracing::info!("Found database url in {}", ENV_WALLET_DB);
            config.database.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Invalid("wallet db connection string is empty"));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server port is empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive"));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "database.min_connections exceeds max_connections",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be positive"));
        }
        // A deadline shorter than the retry budget would report every
        // contention storm as a cancellation
        if let Some(timeout) = self.server.request_timeout() {
            let budget = self.retry.policy().total_backoff() + RETRY_DEADLINE_HEADROOM;
            if timeout < budget {
                return Err(ConfigError::Invalid(
                    "server.request_timeout_ms is shorter than the retry backoff budget",
                ));
            }
        }
        if !matches!(self.rotation.as_str(), "hourly" | "daily" | "never") {
            return Err(ConfigError::Invalid(
                "rotation must be one of hourly, daily, never",
            ));
        }
        Ok(())
    }
}
