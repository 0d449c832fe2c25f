//! Point-balance ledger service.
//!
//! Tracks a per-user integer point balance, enforces the business
//! invariants (non-negative balance, configurable ceiling), and records
//! every balance-changing operation in an append-only history.
//!
//! # Modules
//!
//! - [`core_types`] - Core type aliases (UserId, Point, etc.)
//! - [`model`] - UserPoint and PointHistory types
//! - [`error`] - Service and store error kinds
//! - [`store`] - Balance/history store boundaries and in-memory tables
//! - [`lock`] - Per-user FIFO lock registry
//! - [`service`] - Ledger orchestration (get/charge/use/history)
//! - [`gateway`] - HTTP API (axum)
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing initialization

pub mod config;
pub mod core_types;
pub mod error;
pub mod gateway;
pub mod lock;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

// Convenient re-exports at crate root
pub use core_types::{Amount, HistoryId, Point, TimestampMs, UserId};
pub use error::{LedgerError, StoreError};
pub use lock::{UserLockGuard, UserLockRegistry};
pub use model::{PointHistory, TransactionType, UserPoint};
pub use service::{PointService, DEFAULT_MAX_BALANCE};
pub use store::{BalanceStore, HistoryStore, MemoryBalanceStore, MemoryHistoryStore};
