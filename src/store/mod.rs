//! Store boundaries for the ledger service.
//!
//! The service treats each store call as independently atomic (single-key
//! upsert, single-row append) and relies on the per-user lock registry, not
//! on store-level transactions, to make the read-check-write sequence
//! appear atomic to concurrent callers of the same user.

pub mod memory;

use async_trait::async_trait;

use crate::core_types::{Amount, Point, TimestampMs, UserId};
use crate::error::StoreError;
use crate::model::{PointHistory, TransactionType, UserPoint};

pub use memory::{MemoryBalanceStore, MemoryHistoryStore};

/// Current-balance table: point lookup and upsert.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Point lookup by user id. `None` when no row exists.
    async fn lookup(&self, user_id: UserId) -> Result<Option<UserPoint>, StoreError>;

    /// Replace the stored balance, creating the row if absent.
    /// Sets `updated_at` to the current time and returns the stored row.
    async fn upsert(&self, user_id: UserId, point: Point) -> Result<UserPoint, StoreError>;
}

/// Append-only transaction history table.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one entry; the store assigns the monotonic entry id.
    async fn append(
        &self,
        user_id: UserId,
        amount: Amount,
        kind: TransactionType,
        timestamp: TimestampMs,
    ) -> Result<PointHistory, StoreError>;

    /// All entries for a user in insertion order. Empty when none.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PointHistory>, StoreError>;
}
