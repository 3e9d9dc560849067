//! Repository trait for link routing configuration access.

use crate::domain::entities::RoutingInfo;
use crate::error::AppError;
use async_trait::async_trait;

/// Read-only access to link routing configuration.
///
/// Links are created and updated by an external management collaborator;
/// this service only ever reads them, one lookup per redirect request, with
/// no caching between calls.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryLinkRepository`] - in-memory fake
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Fetches the routing configuration for a short link.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RoutingInfo))` if the link exists
    /// - `Ok(None)` if it does not
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Retryable`] on storage
    /// failures.
    async fn get_routing_info(&self, link_id: &str) -> Result<Option<RoutingInfo>, AppError>;
}
