//! Wallet API - PostgreSQL-backed wallet balances
//!
//! Deposits and withdrawals run as SERIALIZABLE transactions; serialization
//! conflicts are retried with linear backoff up to a fixed attempt budget.
//!
//! # Modules
//!
//! - [`wallet`] - Balance core: mutator, retry loop, repository, service
//! - [`db`] - Connection pool and migrations
//! - [`gateway`] - HTTP API (axum)
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod wallet;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use wallet::{BalanceService, PgWalletRepository, RetryCoordinator, WalletError, WalletStore};
