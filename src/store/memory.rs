//! In-process table implementations of the store boundaries.
//!
//! These back the service the same way the reference system's in-memory
//! tables did, including an optional simulated per-call latency. The jitter
//! widens the read-modify-write window, which is what makes lost-update
//! races observable in concurrency tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;

use crate::core_types::{now_millis, Amount, Point, TimestampMs, UserId};
use crate::error::StoreError;
use crate::model::{PointHistory, TransactionType, UserPoint};
use crate::store::{BalanceStore, HistoryStore};

async fn simulate_latency(max: Option<Duration>) {
    if let Some(max) = max {
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..=max);
        tokio::time::sleep(jitter).await;
    }
}

/// In-memory balance table.
#[derive(Default)]
pub struct MemoryBalanceStore {
    rows: RwLock<HashMap<UserId, UserPoint>>,
    latency: Option<Duration>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add up to `max` of random delay to every call.
    pub fn with_latency(max: Duration) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            latency: Some(max),
        }
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn lookup(&self, user_id: UserId) -> Result<Option<UserPoint>, StoreError> {
        simulate_latency(self.latency).await;
        Ok(self.rows.read().await.get(&user_id).copied())
    }

    async fn upsert(&self, user_id: UserId, point: Point) -> Result<UserPoint, StoreError> {
        simulate_latency(self.latency).await;
        let row = UserPoint {
            id: user_id,
            point,
            updated_at: now_millis(),
        };
        self.rows.write().await.insert(user_id, row);
        Ok(row)
    }
}

/// In-memory append-only history table.
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<PointHistory>>,
    next_id: AtomicU64,
    latency: Option<Duration>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            latency: None,
        }
    }

    /// Add up to `max` of random delay to every call.
    pub fn with_latency(max: Duration) -> Self {
        Self {
            latency: Some(max),
            ..Self::new()
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(
        &self,
        user_id: UserId,
        amount: Amount,
        kind: TransactionType,
        timestamp: TimestampMs,
    ) -> Result<PointHistory, StoreError> {
        simulate_latency(self.latency).await;
        let entry = PointHistory {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            amount,
            kind,
            timestamp,
        };
        self.entries.write().await.push(entry);
        Ok(entry)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PointHistory>, StoreError> {
        simulate_latency(self.latency).await;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .copied()
            .collect())
    }
}
