//! Balance mutator: one deposit/withdraw as one SERIALIZABLE transaction
//!
//! The conditional update is the whole concurrency story: PostgreSQL detects
//! two transactions racing on the same row and aborts one of them with
//! SQLSTATE 40001, which is reported as [`MutationOutcome::TransientConflict`]
//! for the retry loop to absorb.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, Postgres, Transaction};
use tracing::{debug, error, warn};

use super::error::{is_retryable_sqlstate, sqlstate};
use super::models::{MutationOutcome, MutationRequest};
use super::queries;
use super::retry::MutationAttempt;

pub struct BalanceMutator;

impl BalanceMutator {
    /// Execute one attempt of `request` on `conn`.
    ///
    /// The transaction is committed only when exactly one row was updated and
    /// rolled back on every other path. If the returned future is dropped
    /// mid-flight, the `Transaction` guard queues a rollback that runs before
    /// the connection is reused or returned to the pool.
    pub async fn mutate(conn: &mut PgConnection, request: &MutationRequest) -> MutationOutcome {
        debug_assert!(request.amount > 0, "amount must be validated upstream");

        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => return classify(&e),
        };

        match Self::apply(&mut tx, request).await {
            Ok(MutationOutcome::Success) => match tx.commit().await {
                Ok(()) => {
                    debug!(
                        wallet_id = %request.wallet_id,
                        kind = %request.kind,
                        amount = request.amount,
                        "Balance mutation committed"
                    );
                    MutationOutcome::Success
                }
                Err(e) => classify(&e),
            },
            Ok(outcome) => {
                rollback(tx).await;
                outcome
            }
            Err(e) => {
                rollback(tx).await;
                classify(&e)
            }
        }
    }

    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        request: &MutationRequest,
    ) -> Result<MutationOutcome, sqlx::Error> {
        sqlx::query(queries::SET_SERIALIZABLE)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query(queries::update_for(request.kind))
            .bind(request.wallet_id)
            .bind(request.amount)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(MutationOutcome::Success);
        }

        // Zero rows: either the wallet is missing or the withdraw guard failed
        let exists: bool = sqlx::query_scalar(queries::WALLET_EXISTS)
            .bind(request.wallet_id)
            .fetch_one(&mut **tx)
            .await?;

        Ok(if exists {
            MutationOutcome::InsufficientBalance
        } else {
            MutationOutcome::WalletNotFound
        })
    }
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        // The connection is poisoned at this point; the pool discards it on release
        warn!("Transaction rollback failed: {}", e);
    }
}

/// Map a storage error to a mutation outcome
pub fn classify(err: &sqlx::Error) -> MutationOutcome {
    let code = sqlstate(err);
    if is_retryable_sqlstate(code.as_deref()) {
        debug!(sqlstate = ?code, "Serialization conflict");
        MutationOutcome::TransientConflict
    } else {
        error!(sqlstate = ?code, "Balance mutation failed: {}", err);
        MutationOutcome::SystemFailure(err.to_string())
    }
}

/// [`MutationAttempt`] bound to one pooled connection
pub struct PgMutation<'c> {
    conn: &'c mut PgConnection,
    request: MutationRequest,
}

impl<'c> PgMutation<'c> {
    pub fn new(conn: &'c mut PgConnection, request: MutationRequest) -> Self {
        Self { conn, request }
    }
}

#[async_trait]
impl MutationAttempt for PgMutation<'_> {
    async fn attempt(&mut self) -> MutationOutcome {
        BalanceMutator::mutate(self.conn, &self.request).await
    }
}
