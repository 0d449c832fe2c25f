//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// User ID - globally unique, immutable after assignment.
///
/// # Usage:
/// - Primary key for balance rows and history entries
/// - Used as the lock registry key
pub type UserId = u64;

/// Current point balance of a user. Never negative, never above the
/// configured ceiling after a committed mutation.
pub type Point = u64;

/// Signed transaction amount as stored in history:
/// positive for CHARGE, negative for USE.
pub type Amount = i64;

/// History entry ID - monotonically assigned sequence number.
pub type HistoryId = u64;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = u64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> TimestampMs {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as TimestampMs)
        .unwrap_or(0)
}
