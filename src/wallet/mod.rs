//! Wallet balance core
//!
//! PostgreSQL-backed balance lookups and mutations.
//!
//! # Write path
//!
//! ```text
//! BalanceService → WalletStore → RetryCoordinator → BalanceMutator → PgConnection
//!   (validate)     (acquire)     (backoff loop)     (SERIALIZABLE tx)
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Never negative**: withdraw is a single guarded `UPDATE ... WHERE balance >= $2`
//! 2. **Fresh attempts**: every retry is a new transaction; failed attempts are rolled back
//! 3. **Bounded retries**: conflicts end in success, a definitive rejection, or
//!    `ConflictExhausted`
//! 4. **Cancellation is not failure**: an expired deadline reports `Cancelled`

pub mod deadline;
pub mod error;
pub mod models;
pub mod mutator;
pub mod queries;
pub mod repository;
pub mod retry;
pub mod service;

#[cfg(test)]
pub mod mock;


// Re-exports for convenience
pub use deadline::Deadline;
pub use error::WalletError;
pub use models::{MutationOutcome, MutationRequest, OperationKind, Wallet, WalletListing};
pub use mutator::BalanceMutator;
pub use repository::{PgWalletRepository, WalletStore};
pub use retry::{RetryCoordinator, RetryPolicy};
pub use service::{BalanceService, BalanceView, ChangeBalance, ErrorKind, ServiceError, WalletList};
