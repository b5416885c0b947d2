//! SQL statements issued against the `wallets` table

use super::models::OperationKind;

/// Must be the first statement of the transaction.
pub const SET_SERIALIZABLE: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE";

pub const DEPOSIT_WALLET: &str = "UPDATE wallets SET balance = balance + $2 WHERE id = $1";

/// Affects zero rows when the balance would go negative.
pub const WITHDRAW_WALLET: &str =
    "UPDATE wallets SET balance = balance - $2 WHERE id = $1 AND balance >= $2";

pub const WALLET_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM wallets WHERE id = $1)";

pub const FIND_WALLET: &str = "SELECT id, balance FROM wallets WHERE id = $1";

pub const LIST_WALLETS: &str = "SELECT id FROM wallets ORDER BY id";

/// Conditional update statement for a mutation kind
pub fn update_for(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Deposit => DEPOSIT_WALLET,
        OperationKind::Withdraw => WITHDRAW_WALLET,
    }
}
