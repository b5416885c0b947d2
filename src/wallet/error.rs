//! Wallet storage error types
//!
//! Classified outcomes of the repository layer. `TransientConflict` never shows
//! up here: the retry loop either absorbs it or turns it into
//! [`WalletError::ConflictExhausted`].

use thiserror::Error;

/// SQLSTATE raised by PostgreSQL when a serializable transaction loses a race.
pub const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for a detected deadlock; the victim may be retried the same way.
pub const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet not found")]
    NotFound,

    #[error("Not enough balance")]
    InsufficientBalance,

    #[error("Write conflict persisted after {attempts} attempts")]
    ConflictExhausted { attempts: u32 },

    #[error("Operation cancelled: deadline exceeded")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(String),
}

impl WalletError {
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::NotFound => "WALLET_NOT_FOUND",
            WalletError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            WalletError::ConflictExhausted { .. } => "CONFLICT_EXHAUSTED",
            WalletError::Cancelled => "CANCELLED",
            WalletError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<sqlx::Error> for WalletError {
    fn from(e: sqlx::Error) -> Self {
        WalletError::Database(e.to_string())
    }
}

/// Whether a SQLSTATE marks a conflict the retry loop should absorb.
pub fn is_retryable_sqlstate(code: Option<&str>) -> bool {
    matches!(
        code,
        Some(SQLSTATE_SERIALIZATION_FAILURE) | Some(SQLSTATE_DEADLOCK_DETECTED)
    )
}

/// SQLSTATE of a backend error, if the error came from the database.
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_sqlstate() {
        assert!(is_retryable_sqlstate(Some("40001")));
        assert!(is_retryable_sqlstate(Some("40P01")));
        assert!(!is_retryable_sqlstate(Some("23514"))); // check_violation
        assert!(!is_retryable_sqlstate(Some("22003"))); // numeric out of range
        assert!(!is_retryable_sqlstate(None));
    }

    #[test]
    fn test_sqlstate_of_non_database_error() {
        assert_eq!(sqlstate(&sqlx::Error::RowNotFound), None);
        assert_eq!(sqlstate(&sqlx::Error::PoolTimedOut), None);
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: WalletError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, WalletError::Database(_)));
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_display() {
        assert_eq!(WalletError::NotFound.to_string(), "Wallet not found");
        assert_eq!(
            WalletError::ConflictExhausted { attempts: 20 }.to_string(),
            "Write conflict persisted after 20 attempts"
        );
    }
}
