//! Conflict retry loop
//!
//! Runs a [`MutationAttempt`] until it yields a definitive outcome, sleeping
//! `attempt * base_delay` between attempts that hit a serialization conflict.
//! The loop is bounded by [`RetryPolicy::max_attempts`]; running out of
//! attempts is reported as [`WalletError::ConflictExhausted`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::deadline::Deadline;
use super::error::WalletError;
use super::models::MutationOutcome;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after a conflict on attempt `attempt` (0-based). Linear, so the
    /// first retry follows immediately.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Sum of every backoff sleep when all attempts conflict. There is no
    /// sleep after the last attempt.
    pub fn total_backoff(&self) -> Duration {
        let n = u64::from(self.max_attempts.max(1));
        let steps = (n - 1) * n.saturating_sub(2) / 2;
        self.base_delay
            .saturating_mul(u32::try_from(steps).unwrap_or(u32::MAX))
    }
}

/// Sleep capability, injectable so tests can observe backoff without waiting
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// One balance-mutation attempt. Each call must be a fresh transaction.
#[async_trait]
pub trait MutationAttempt: Send {
    async fn attempt(&mut self) -> MutationOutcome;
}

pub struct RetryCoordinator {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryCoordinator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            policy: RetryPolicy::new(policy.max_attempts, policy.base_delay),
            sleeper,
        }
    }

    /// Drive `op` to a definitive outcome.
    ///
    /// Attempts and backoff sleeps both run under `deadline`; expiry stops the
    /// loop with [`WalletError::Cancelled`].
    pub async fn run<A>(&self, deadline: Deadline, op: &mut A) -> Result<(), WalletError>
    where
        A: MutationAttempt + ?Sized,
    {
        let max_attempts = self.policy.max_attempts;

        for attempt in 0..max_attempts {
            match deadline.run(op.attempt()).await? {
                MutationOutcome::Success => return Ok(()),
                MutationOutcome::WalletNotFound => return Err(WalletError::NotFound),
                MutationOutcome::InsufficientBalance => {
                    return Err(WalletError::InsufficientBalance);
                }
                MutationOutcome::SystemFailure(detail) => {
                    return Err(WalletError::Database(detail));
                }
                MutationOutcome::TransientConflict => {
                    if attempt + 1 == max_attempts {
                        break;
                    }
                    let delay = self.policy.backoff(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Serialization conflict, retrying"
                    );
                    deadline.run(self.sleeper.sleep(delay)).await?;
                }
            }
        }

        warn!(attempts = max_attempts, "Write conflict retries exhausted");
        Err(WalletError::ConflictExhausted {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records requested delays and returns immediately
    #[derive(Default)]
    pub struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    /// Replays a fixed script of outcomes, then repeats `fallback`
    pub struct ScriptedAttempt {
        script: VecDeque<MutationOutcome>,
        fallback: MutationOutcome,
        pub calls: u32,
    }

    impl ScriptedAttempt {
        pub fn new(script: Vec<MutationOutcome>, fallback: MutationOutcome) -> Self {
            Self {
                script: script.into(),
                fallback,
                calls: 0,
            }
        }

        pub fn always(outcome: MutationOutcome) -> Self {
            Self::new(Vec::new(), outcome)
        }
    }

    #[async_trait]
    impl MutationAttempt for ScriptedAttempt {
        async fn attempt(&mut self) -> MutationOutcome {
            self.calls += 1;
            self.script
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }
}
