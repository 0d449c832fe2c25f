//! Service error kinds.
//!
//! All four business errors are distinct, recoverable outcomes surfaced
//! directly to the caller; none are retried internally. Store failures are
//! a separate transient kind and are never masked.

use thiserror::Error;

use crate::core_types::Point;

/// Failure at the store boundary (lookup, upsert, append, scan).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ledger business errors plus propagated store failures.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Unknown user identity (balance query, history query, or `use`
    /// against a never-initialized user).
    #[error("user not found")]
    NotFound,

    /// Non-positive amount supplied to charge/use. Rejected before lock
    /// acquisition.
    #[error("amount must be a positive integer")]
    InvalidAmount,

    /// Charge would push the balance above the configured ceiling.
    #[error("max limit point is {max}")]
    LimitExceeded { max: Point },

    /// Use amount exceeds the current balance.
    #[error("not enough points: balance {current}, requested {requested}")]
    InsufficientFunds { current: Point, requested: Point },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_limit_and_balance() {
        let e = LedgerError::LimitExceeded { max: 100_000 };
        assert_eq!(e.to_string(), "max limit point is 100000");

        let e = LedgerError::InsufficientFunds {
            current: 10,
            requested: 30,
        };
        assert!(e.to_string().contains("balance 10"));
        assert!(e.to_string().contains("requested 30"));
    }

    #[test]
    fn store_error_propagates_transparently() {
        let e = LedgerError::from(StoreError::Unavailable("balance table".into()));
        assert_eq!(e.to_string(), "store unavailable: balance table");
    }
}
