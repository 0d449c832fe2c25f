//! Ledger service: per-user balance queries and serialized mutations.
//!
//! Mutations run as lookup → invariant check → history append → balance
//! upsert, entirely inside the user's critical section. The per-user lock,
//! not a store transaction, is what makes the sequence appear atomic to
//! concurrent callers of the same user.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core_types::{now_millis, Amount, Point, UserId};
use crate::error::{LedgerError, Result};
use crate::lock::UserLockRegistry;
use crate::model::{PointHistory, TransactionType, UserPoint};
use crate::store::{BalanceStore, HistoryStore};

/// Default balance ceiling, applied uniformly to all users.
pub const DEFAULT_MAX_BALANCE: Point = 100_000;

pub struct PointService {
    balances: Arc<dyn BalanceStore>,
    histories: Arc<dyn HistoryStore>,
    locks: Arc<UserLockRegistry>,
    max_balance: Point,
}

impl PointService {
    pub fn new(balances: Arc<dyn BalanceStore>, histories: Arc<dyn HistoryStore>) -> Self {
        Self::with_max_balance(balances, histories, DEFAULT_MAX_BALANCE)
    }

    pub fn with_max_balance(
        balances: Arc<dyn BalanceStore>,
        histories: Arc<dyn HistoryStore>,
        max_balance: Point,
    ) -> Self {
        Self {
            balances,
            histories,
            locks: Arc::new(UserLockRegistry::new()),
            max_balance,
        }
    }

    pub fn max_balance(&self) -> Point {
        self.max_balance
    }

    /// Current balance of a user. Plain point read, no locking: a read
    /// issued concurrently with a mutation may observe the pre-commit value.
    pub async fn get_point(&self, user_id: UserId) -> Result<UserPoint> {
        self.balances
            .lookup(user_id)
            .await?
            .ok_or(LedgerError::NotFound)
    }

    /// Full transaction history of a user in insertion order.
    ///
    /// A user with zero entries is reported as NotFound: "no history" is
    /// indistinguishable from "unknown user" in this design.
    pub async fn get_histories(&self, user_id: UserId) -> Result<Vec<PointHistory>> {
        let entries = self.histories.list_by_user(user_id).await?;
        if entries.is_empty() {
            return Err(LedgerError::NotFound);
        }
        Ok(entries)
    }

    /// Increase the user's balance by `amount`.
    ///
    /// A user without a balance row is initialized at zero before the
    /// charge is applied. Fails with `LimitExceeded` when the result would
    /// pass the ceiling; no writes happen on any failure.
    pub async fn charge(&self, user_id: UserId, amount: Amount) -> Result<UserPoint> {
        let amount = validate_amount(amount)?;

        let balances = Arc::clone(&self.balances);
        let histories = Arc::clone(&self.histories);
        let locks = Arc::clone(&self.locks);
        let max_balance = self.max_balance;

        // Once validation passes, the operation is commit-bound: the
        // critical section runs in its own task so a caller dropped
        // mid-request cannot abort between the history append and the
        // balance upsert.
        run_committed(async move {
            let _guard = locks.acquire(user_id).await;

            let current = balances
                .lookup(user_id)
                .await?
                .map(|row| row.point)
                .unwrap_or(0);

            let new_point = current
                .checked_add(amount)
                .filter(|p| *p <= max_balance)
                .ok_or_else(|| {
                    warn!(user_id, amount, current, "charge rejected: over ceiling");
                    LedgerError::LimitExceeded { max: max_balance }
                })?;

            histories
                .append(user_id, amount as Amount, TransactionType::Charge, now_millis())
                .await?;
            let updated = balances.upsert(user_id, new_point).await?;

            debug!(user_id, amount, point = updated.point, "charge committed");
            Ok(updated)
        })
        .await
    }

    /// Decrease the user's balance by `amount` (spending).
    ///
    /// Fails with `NotFound` for an unknown user and `InsufficientFunds`
    /// when the balance cannot cover the amount; no writes on failure.
    pub async fn use_points(&self, user_id: UserId, amount: Amount) -> Result<UserPoint> {
        let amount = validate_amount(amount)?;

        let balances = Arc::clone(&self.balances);
        let histories = Arc::clone(&self.histories);
        let locks = Arc::clone(&self.locks);

        run_committed(async move {
            let _guard = locks.acquire(user_id).await;

            let current = balances
                .lookup(user_id)
                .await?
                .ok_or(LedgerError::NotFound)?
                .point;

            if current < amount {
                warn!(user_id, amount, current, "use rejected: insufficient funds");
                return Err(LedgerError::InsufficientFunds {
                    current,
                    requested: amount,
                });
            }

            histories
                .append(
                    user_id,
                    -(amount as Amount),
                    TransactionType::Use,
                    now_millis(),
                )
                .await?;
            let updated = balances.upsert(user_id, current - amount).await?;

            debug!(user_id, amount, point = updated.point, "use committed");
            Ok(updated)
        })
        .await
    }
}

/// Run a mutation's critical section isolated from caller cancellation.
///
/// The read-check-append-upsert sequence must run to completion even when
/// the caller's future is dropped (an HTTP client disconnecting mid-request
/// drops the handler future): tearing it apart between the two writes would
/// leave history recording a transaction the balance never saw.
async fn run_committed(
    section: impl std::future::Future<Output = Result<UserPoint>> + Send + 'static,
) -> Result<UserPoint> {
    match tokio::spawn(section).await {
        Ok(result) => result,
        // The task is never aborted, so a join error is a panic in the
        // critical section; surface it on the caller's thread.
        Err(err) => std::panic::resume_unwind(err.into_panic()),
    }
}

/// Amount validation happens before lock acquisition: malformed requests
/// cause no lock churn.
fn validate_amount(amount: Amount) -> Result<Point> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(amount as Point)
}
