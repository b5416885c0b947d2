//! Balance service
//!
//! Boundary between the HTTP layer and the wallet core. Validates protocol
//! shape (positive amount, known operation type), runs every call under a
//! per-request deadline and converts each [`WalletError`] into exactly one
//! [`ServiceError`]. Storage error text is logged here and never returned.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::deadline::Deadline;
use super::error::WalletError;
use super::models::OperationKind;
use super::repository::WalletStore;

/// Longest prefix of a rejected operation type written to the log
const MAX_LOGGED_OPERATION_LEN: usize = 32;

/// Client-facing error class. The HTTP layer maps each kind to one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidOperation,
    SystemFailure,
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("wallet not found")]
    WalletNotFound,

    #[error("not enough balance")]
    InsufficientBalance,

    #[error("amount must be more than zero")]
    InvalidAmount,

    /// Carries the rejected value for logging; never echoed to the client
    #[error("incorrect operation type")]
    InvalidOperationType(String),

    #[error("too many concurrent updates, try again later")]
    ConflictExhausted,

    #[error("request cancelled: deadline exceeded")]
    Cancelled,

    #[error("internal server error")]
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::WalletNotFound => ErrorKind::NotFound,
            ServiceError::InsufficientBalance
            | ServiceError::InvalidAmount
            | ServiceError::InvalidOperationType(_) => ErrorKind::InvalidOperation,
            ServiceError::ConflictExhausted | ServiceError::Internal => ErrorKind::SystemFailure,
            ServiceError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::WalletNotFound => "WALLET_NOT_FOUND",
            ServiceError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ServiceError::InvalidAmount => "INVALID_AMOUNT",
            ServiceError::InvalidOperationType(_) => "INVALID_OPERATION",
            ServiceError::ConflictExhausted => "CONFLICT_EXHAUSTED",
            ServiceError::Cancelled => "REQUEST_CANCELLED",
            ServiceError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidOperation => 400,
            ErrorKind::SystemFailure => 500,
            ErrorKind::Cancelled => 504,
        }
    }
}

impl From<WalletError> for ServiceError {
    fn from(e: WalletError) -> Self {
        let code = e.code();
        match e {
            WalletError::NotFound => ServiceError::WalletNotFound,
            WalletError::InsufficientBalance => ServiceError::InsufficientBalance,
            WalletError::ConflictExhausted { attempts } => {
                warn!(code, attempts, "Balance update gave up under contention");
                ServiceError::ConflictExhausted
            }
            WalletError::Cancelled => {
                debug!(code, "Wallet operation abandoned at deadline");
                ServiceError::Cancelled
            }
            WalletError::Database(detail) => {
                error!(code, "Wallet storage failure: {}", detail);
                ServiceError::Internal
            }
        }
    }
}

/// Balance change command as received from the client
#[derive(Debug, Clone)]
pub struct ChangeBalance {
    pub wallet_id: Uuid,
    pub amount: i64,
    pub operation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BalanceView {
    #[schema(example = 1000)]
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WalletRef {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WalletList {
    pub wallets: Vec<WalletRef>,
    /// Rows that could not be decoded and were left out
    #[schema(example = 0)]
    pub skipped: usize,
}

pub struct BalanceService {
    store: Arc<dyn WalletStore>,
    request_timeout: Option<Duration>,
}

impl BalanceService {
    pub fn new(store: Arc<dyn WalletStore>, request_timeout: Option<Duration>) -> Self {
        Self {
            store,
            request_timeout,
        }
    }

    fn deadline(&self) -> Deadline {
        Deadline::from_timeout(self.request_timeout)
    }

    pub async fn get_balance(&self, wallet_id: Uuid) -> Result<BalanceView, ServiceError> {
        let wallet = self.store.find_by_id(wallet_id, self.deadline()).await?;
        Ok(BalanceView {
            balance: wallet.balance,
        })
    }

    pub async fn change_balance(&self, cmd: ChangeBalance) -> Result<(), ServiceError> {
        let kind = OperationKind::from_str(&cmd.operation).map_err(|op| {
            let shown: String = op.chars().take(MAX_LOGGED_OPERATION_LEN).collect();
            debug!(wallet_id = %cmd.wallet_id, operation = %shown, "Rejected operation type");
            ServiceError::InvalidOperationType(op)
        })?;
        if cmd.amount <= 0 {
            return Err(ServiceError::InvalidAmount);
        }

        let deadline = self.deadline();
        match kind {
            OperationKind::Deposit => {
                self.store
                    .deposit(cmd.wallet_id, cmd.amount, deadline)
                    .await?
            }
            OperationKind::Withdraw => {
                self.store
                    .withdraw(cmd.wallet_id, cmd.amount, deadline)
                    .await?
            }
        }
        Ok(())
    }

    pub async fn list_wallets(&self) -> Result<WalletList, ServiceError> {
        let listing = self.store.list_all(self.deadline()).await?;
        Ok(WalletList {
            wallets: listing.ids.into_iter().map(|id| WalletRef { id }).collect(),
            skipped: listing.skipped,
        })
    }
}
