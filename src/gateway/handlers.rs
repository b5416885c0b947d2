//! HTTP handlers

pub mod health;
pub mod wallet;

pub use health::{HealthResponse, health_check};
pub use wallet::{change_balance, get_balance, list_wallets};
