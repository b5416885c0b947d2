//! Wallet repository: read path + retried write path

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::Row;
use tracing::{debug, warn};
use uuid::Uuid;

use super::deadline::Deadline;
use super::error::WalletError;
use super::models::{MutationRequest, OperationKind, Wallet, WalletListing};
use super::mutator::PgMutation;
use super::queries;
use super::retry::RetryCoordinator;
use crate::db::Database;

/// Wallet storage capability
///
/// One production implementation ([`PgWalletRepository`]); tests use an
/// in-memory double with the same contract.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid, deadline: Deadline) -> Result<Wallet, WalletError>;

    /// All wallet ids. Rows that fail to decode are skipped and counted.
    async fn list_all(&self, deadline: Deadline) -> Result<WalletListing, WalletError>;

    async fn deposit(&self, id: Uuid, amount: i64, deadline: Deadline) -> Result<(), WalletError>;

    async fn withdraw(&self, id: Uuid, amount: i64, deadline: Deadline)
    -> Result<(), WalletError>;
}

pub struct PgWalletRepository {
    db: Arc<Database>,
    retry: RetryCoordinator,
}

impl PgWalletRepository {
    pub fn new(db: Arc<Database>, retry: RetryCoordinator) -> Self {
        Self { db, retry }
    }

    /// Acquire one connection and run the retry loop on it.
    ///
    /// The connection goes back to the pool when `conn` drops, on every path.
    async fn change_balance(
        &self,
        request: MutationRequest,
        deadline: Deadline,
    ) -> Result<(), WalletError> {
        debug!(
            wallet_id = %request.wallet_id,
            kind = %request.kind,
            amount = request.amount,
            "Balance operation start"
        );

        let mut conn = deadline.run(self.db.pool().acquire()).await??;
        let mut op = PgMutation::new(&mut *conn, request);
        let result = self.retry.run(deadline, &mut op).await;

        match &result {
            Ok(()) => debug!(
                wallet_id = %request.wallet_id,
                kind = %request.kind,
                "Balance operation success"
            ),
            Err(e) => debug!(
                wallet_id = %request.wallet_id,
                kind = %request.kind,
                error = %e,
                "Balance operation rejected"
            ),
        }
        result
    }
}

/// Fold decoded ids into a listing. Undecodable rows are logged and counted
/// so partially corrupt data does not hide the healthy rows.
pub(crate) fn collect_listing<E, I>(rows: I) -> WalletListing
where
    E: std::fmt::Display,
    I: IntoIterator<Item = Result<Uuid, E>>,
{
    let mut listing = WalletListing::default();
    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Ok(id) => listing.ids.push(id),
            Err(e) => {
                warn!(row = index, "Skipping undecodable wallet row: {}", e);
                listing.skipped += 1;
            }
        }
    }
    if listing.skipped > 0 {
        warn!(
            skipped = listing.skipped,
            total = listing.ids.len() + listing.skipped,
            "Wallet listing incomplete"
        );
    }
    listing
}

#[async_trait]
impl WalletStore for PgWalletRepository {
    async fn find_by_id(&self, id: Uuid, deadline: Deadline) -> Result<Wallet, WalletError> {
        let row = deadline
            .run(
                sqlx::query(queries::FIND_WALLET)
                    .bind(id)
                    .fetch_optional(self.db.pool()),
            )
            .await??;

        match row {
            Some(r) => Ok(Wallet {
                id: r.try_get("id")?,
                balance: r.try_get("balance")?,
            }),
            None => Err(WalletError::NotFound),
        }
    }

    async fn list_all(&self, deadline: Deadline) -> Result<WalletListing, WalletError> {
        let rows = deadline
            .run(sqlx::query(queries::LIST_WALLETS).fetch_all(self.db.pool()))
            .await??;

        Ok(collect_listing(
            rows.iter().map(|row| row.try_get::<Uuid, _>("id")),
        ))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_listing_skips_and_counts_bad_rows() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            Ok(a),
            Err(sqlx::Error::ColumnDecode {
                index: "\"id\"".into(),
                source: "invalid length: expected 16 bytes, found 3".into(),
            }),
            Ok(b),
        ];

        let listing = collect_listing(rows);
        assert_eq!(listing.ids, vec![a, b]);
        assert_eq!(listing.skipped, 1);
    }

    #[test]
    fn test_collect_listing_all_rows_bad() {
        let rows: Vec<Result<Uuid, sqlx::Error>> = vec![
            Err(sqlx::Error::ColumnNotFound("id".into())),
            Err(sqlx::Error::ColumnNotFound("id".into())),
        ];

        let listing = collect_listing(rows);
        assert!(listing.ids.is_empty());
        assert_eq!(listing.skipped, 2);
    }

    #[test]
    fn test_collect_listing_clean() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let listing = collect_listing(ids.iter().copied().map(Ok::<_, sqlx::Error>));
        assert_eq!(listing.ids, ids);
        assert_eq!(listing.skipped, 0);
    }
}
