//! Database connection management

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(config: &DatabaseConfig, app_name: &str) -> Result<Self, sqlx::Error> {
        let mut options = PgConnectOptions::from_str(&config.url)?.application_name(app_name);
        if config.use_pgbouncer {
            // Transaction-mode poolers cannot hold named prepared statements
            options = options.statement_cache_capacity(0);
        }

        let mut pool_options = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.connect_timeout_ms));
        if config.idle_timeout_ms > 0 {
            pool_options = pool_options.idle_timeout(Duration::from_millis(config.idle_timeout_ms));
        }

        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            min = config.min_connections,
            max = config.max_connections,
            "PostgreSQL connection pool established"
        );
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations from `./migrations`
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }
}
