//! In-memory wallet store for tests
//!
//! Simulates SERIALIZABLE semantics with a per-row version: an attempt reads
//! the row, yields, then commits only if nobody else committed in between,
//! otherwise it reports a transient conflict. Writes go through the real
//! [`RetryCoordinator`], so contention exercises the production retry loop.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::deadline::Deadline;
use super::error::WalletError;
use super::models::{MutationOutcome, MutationRequest, OperationKind, Wallet, WalletListing};
use super::repository::{WalletStore, collect_listing};
use super::retry::{MutationAttempt, RetryCoordinator, RetryPolicy, Sleeper};

#[derive(Debug, Clone, Copy)]
struct Row {
    balance: i64,
    version: u64,
}

/// Sleeper that only yields, so retries interleave without wall-clock delay
pub struct YieldSleeper;

#[async_trait]
impl Sleeper for YieldSleeper {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

pub struct InMemoryWalletStore {
    rows: Mutex<HashMap<Uuid, Row>>,
    retry: RetryCoordinator,
    /// Outcomes returned before touching the rows
    forced: Mutex<VecDeque<MutationOutcome>>,
    always_conflict: AtomicBool,
    corrupt_rows: AtomicUsize,
    latency: Mutex<Duration>,
    read_failure: Mutex<Option<String>>,
    attempts: AtomicU32,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::with_retry(RetryCoordinator::with_sleeper(
            RetryPolicy::default(),
            Arc::new(YieldSleeper),
        ))
    }

    pub fn with_retry(retry: RetryCoordinator) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            retry,
            forced: Mutex::new(VecDeque::new()),
            always_conflict: AtomicBool::new(false),
            corrupt_rows: AtomicUsize::new(0),
            latency: Mutex::new(Duration::ZERO),
            read_failure: Mutex::new(None),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn insert(&self, id: Uuid, balance: i64) {
        self.rows
            .lock()
            .unwrap()
            .insert(id, Row { balance, version: 0 });
    }

    pub fn balance(&self, id: Uuid) -> Option<i64> {
        self.rows.lock().unwrap().get(&id).map(|r| r.balance)
    }

    pub fn force_outcomes(&self, outcomes: Vec<MutationOutcome>) {
        self.forced.lock().unwrap().extend(outcomes);
    }

    pub fn set_always_conflict(&self, on: bool) {
        self.always_conflict.store(on, Ordering::SeqCst);
    }

    /// Pretend `n` stored rows cannot be decoded
    pub fn set_corrupt_rows(&self, n: usize) {
        self.corrupt_rows.store(n, Ordering::SeqCst);
    }

    /// Delay applied before every operation (under the caller's deadline)
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn fail_reads(&self, detail: &str) {
        *self.read_failure.lock().unwrap() = Some(detail.to_string());
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self, deadline: Deadline) -> Result<(), WalletError> {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            deadline.run(tokio::time::sleep(latency)).await?;
        }
        Ok(())
    }

    fn check_read_failure(&self) -> Result<(), WalletError> {
        match self.read_failure.lock().unwrap().clone() {
            Some(detail) => Err(WalletError::Database(detail)),
            None => Ok(()),
        }
    }

    async fn attempt_once(&self, request: &MutationRequest) -> MutationOutcome {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(outcome) = self.forced.lock().unwrap().pop_front() {
            return outcome;
        }
        if self.always_conflict.load(Ordering::SeqCst) {
            return MutationOutcome::TransientConflict;
        }

        let seen = match self.rows.lock().unwrap().get(&request.wallet_id) {
            Some(row) => *row,
            None => return MutationOutcome::WalletNotFound,
        };

        // Window in which a concurrent writer may commit first
        tokio::task::yield_now().await;

        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&request.wallet_id) else {
            return MutationOutcome::WalletNotFound;
        };
        if row.version != seen.version {
            return MutationOutcome::TransientConflict;
        }

        let new_balance = match request.kind {
            OperationKind::Deposit => match row.balance.checked_add(request.amount) {
                Some(b) => b,
                None => return MutationOutcome::SystemFailure("bigint out of range".into()),
            },
            OperationKind::Withdraw => {
                if row.balance < request.amount {
                    return MutationOutcome::InsufficientBalance;
                }
                row.balance - request.amount
            }
        };

        row.balance = new_balance;
        row.version += 1;
        MutationOutcome::Success
    }

    async fn change_balance(
        &self,
        request: MutationRequest,
        deadline: Deadline,
    ) -> Result<(), WalletError> {
        self.simulate_latency(deadline).await?;
        let mut op = MemoryMutation {
            store: self,
            request,
        };
        self.retry.run(deadline, &mut op).await
    }
}

impl Default for InMemoryWalletStore {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryMutation<'a> {
    store: &'a InMemoryWalletStore,
    request: MutationRequest,
}

#[async_trait]
impl MutationAttempt for MemoryMutation<'_> {
    async fn attempt(&mut self) -> MutationOutcome {
        self.store.attempt_once(&self.request).await
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn find_by_id(&self, id: Uuid, deadline: Deadline) -> Result<Wallet, WalletError> {
        self.simulate_latency(deadline).await?;
        self.check_read_failure()?;
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .map(|row| Wallet {
                id,
                balance: row.balance,
            })
            .ok_or(WalletError::NotFound)
    }

    async fn list_all(&self, deadline: Deadline) -> Result<WalletListing, WalletError> {
        self.simulate_latency(deadline).await?;
        self.check_read_failure()?;
        let mut ids: Vec<Uuid> = self.rows.lock().unwrap().keys().copied().collect();
        ids.sort();
        let corrupt = self.corrupt_rows.load(Ordering::SeqCst);
        let rows = ids
            .into_iter()
            .map(Ok)
            .chain((0..corrupt).map(|_| Err("invalid uuid: found 3 bytes")));
        Ok(collect_listing(rows))
    }

    async fn deposit(&self, id: Uuid, amount: i64, deadline: Deadline) -> Result<(), WalletError> {
        self.change_balance(
            MutationRequest::new(id, amount, OperationKind::Deposit),
            deadline,
        )
        .await
    }

    async fn withdraw(
        &self,
        id: Uuid,
        amount: i64,
        deadline: Deadline,
    ) -> Result<(), WalletError> {
        self.change_balance(
            MutationRequest::new(id, amount, OperationKind::Withdraw),
            deadline,
        )
        .await
    }
}
