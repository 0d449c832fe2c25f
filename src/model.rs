//! Ledger data model: balance rows and history entries.

use serde::{Deserialize, Serialize};

use crate::core_types::{Amount, HistoryId, Point, TimestampMs, UserId};

/// Current point balance of one user.
///
/// Owned by the balance store; the service never caches it across
/// operations. `updated_at` is refreshed on every committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoint {
    pub id: UserId,
    pub point: Point,
    pub updated_at: TimestampMs,
}

/// Kind of a balance-changing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Charge,
    Use,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Charge => "CHARGE",
            TransactionType::Use => "USE",
        }
    }
}

/// One immutable entry in the append-only transaction history.
///
/// `amount` is signed: positive for CHARGE, negative for USE. Insertion
/// order is significant for audit replay; `id` is assigned by the history
/// store from a monotonic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointHistory {
    pub id: HistoryId,
    pub user_id: UserId,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub timestamp: TimestampMs,
}
