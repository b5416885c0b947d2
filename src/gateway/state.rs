use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db::Database;
use crate::wallet::BalanceService;

/// Minimum spacing between database pings from the health endpoint
pub const HEALTH_CHECK_INTERVAL_MS: u64 = 5000;

/// Shared gateway state
pub struct AppState {
    pub service: Arc<BalanceService>,
    /// Pinged by the health check; absent in handler tests
    pub db: Option<Arc<Database>>,
    /// Time of the last successful health ping, 0 = never
    health_last_check_ms: AtomicU64,
}

impl AppState {
    pub fn new(service: Arc<BalanceService>, db: Option<Arc<Database>>) -> Self {
        Self {
            service,
            db,
            health_last_check_ms: AtomicU64::new(0),
        }
    }

    /// Whether the health endpoint should ping the database at `now_ms`
    pub fn health_ping_due(&self, now_ms: u64) -> bool {
        let last = self.health_last_check_ms.load(Ordering::Relaxed);
        last == 0 || now_ms.saturating_sub(last) > HEALTH_CHECK_INTERVAL_MS
    }

    pub fn record_health_ping(&self, now_ms: u64) {
        self.health_last_check_ms.store(now_ms, Ordering::Relaxed);
    }
}
