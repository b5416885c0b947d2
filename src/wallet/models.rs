//! Wallet data model and mutation types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wallet row: identity + balance in the smallest currency unit.
///
/// `balance >= 0` holds for every committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub id: Uuid,
    pub balance: i64,
}

/// Balance mutation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "DEPOSIT",
            OperationKind::Withdraw => "WITHDRAW",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(OperationKind::Deposit),
            "WITHDRAW" => Ok(OperationKind::Withdraw),
            other => Err(other.to_string()),
        }
    }
}

/// One deposit/withdraw against one wallet. Amount is validated positive
/// before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRequest {
    pub wallet_id: Uuid,
    pub amount: i64,
    pub kind: OperationKind,
}

impl MutationRequest {
    pub fn new(wallet_id: Uuid, amount: i64, kind: OperationKind) -> Self {
        Self {
            wallet_id,
            amount,
            kind,
        }
    }
}

/// Result of a single mutation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success,
    WalletNotFound,
    InsufficientBalance,
    /// Serialization failure raised by the backend. Only the retry loop sees this.
    TransientConflict,
    /// Any other storage error; the detail is for logs only.
    SystemFailure(String),
}

/// Result of a bulk wallet listing.
///
/// Rows that fail to decode are skipped rather than failing the whole
/// listing; `skipped` tells the caller how many were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletListing {
    pub ids: Vec<Uuid>,
    pub skipped: usize,
}
