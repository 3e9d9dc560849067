//! Repository trait for per-account counter snapshots.

use crate::error::AppError;
use async_trait::async_trait;

/// Snapshot storage for the live per-account click counter.
///
/// The aggregator loads a baseline from here when an account's worker is
/// created and stores the final value when the worker is evicted or the
/// process shuts down. Increments between snapshots are lost on a crash;
/// the persisted click records remain the authoritative history.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCounterRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryCounterRepository`] - in-memory fake
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterSnapshotRepository: Send + Sync {
    /// Loads the last persisted counter value for an account.
    ///
    /// Accounts without a snapshot start at zero.
    async fn load(&self, account_id: &str) -> Result<u64, AppError>;

    /// Stores the current counter value for an account, replacing any
    /// previous snapshot.
    async fn store(&self, account_id: &str, count: u64) -> Result<(), AppError>;
}
