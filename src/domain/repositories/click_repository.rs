//! Repository trait for persisted click records.

use crate::domain::entities::NewClick;
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage of click records, keyed by event id.
///
/// The queue delivers events at-least-once, so the write is an idempotent
/// upsert: re-delivering an event id already on record is a no-op, and the
/// persisted store never double-counts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryClickRepository`] - in-memory fake
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Persists a click record if its event id is not already stored.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if a new record was written
    /// - `Ok(false)` if a record with this event id already existed
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Retryable`] on transient storage failures, which
    /// the delivery mechanism answers with redelivery.
    async fn upsert(&self, click: &NewClick) -> Result<bool, AppError>;
}
