//! Per-call deadline
//!
//! Every suspension point of a wallet operation (pool acquisition, statement
//! execution, retry backoff) runs through [`Deadline::run`], so an expired
//! deadline surfaces as [`WalletError::Cancelled`] instead of a storage error.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::error::WalletError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline: work runs until it finishes or the future is dropped
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    /// `Some(timeout)` → deadline `timeout` from now, `None` → no deadline
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map(Self::after).unwrap_or_default()
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Drive `fut` to completion unless the deadline passes first.
    ///
    /// The future is dropped on expiry; callers rely on RAII guards
    /// (pooled connections, transactions) for cleanup.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, WalletError> {
        match self.0 {
            None => Ok(fut.await),
            Some(at) => {
                if Instant::now() >= at {
                    return Err(WalletError::Cancelled);
                }
                tokio::time::timeout_at(at, fut)
                    .await
                    .map_err(|_| WalletError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_no_deadline_runs_to_completion() {
        let deadline = Deadline::none();
        let out = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                7
            })
            .await;
        assert_eq!(out, Ok(7));
        assert!(!deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_reports_cancelled() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let out = deadline
            .run(tokio::time::sleep(Duration::from_secs(1)))
            .await;
        assert_eq!(out, Err(WalletError::Cancelled));
        assert!(deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_expired_does_not_poll() {
        let deadline = Deadline::after(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;

        let mut polled = false;
        let out = deadline.run(async { polled = true }).await;
        assert_eq!(out, Err(WalletError::Cancelled));
        assert!(!polled);
    }

    #[tokio::test]
    async fn test_from_timeout() {
        assert_eq!(Deadline::from_timeout(None), Deadline::none());
        assert!(Deadline::from_timeout(Some(Duration::from_secs(1)))
            .instant()
            .is_some());
    }
}
