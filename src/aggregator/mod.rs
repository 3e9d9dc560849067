//! Live per-account click aggregation.
//!
//! One lightweight sequential worker per active account id owns that
//! account's counter and subscriber set; a registry maps account ids to
//! worker inboxes, creating workers on first access and letting them retire
//! after an idle window. All operations for one account are totally ordered
//! by its worker; operations for different accounts proceed in parallel with
//! no cross-key locking.

pub mod actor;
pub mod registry;

use tokio::sync::{mpsc, oneshot};

pub use registry::AggregatorRegistry;

/// Operations accepted by a per-account worker.
///
/// Processed strictly one at a time in arrival order; this serialization is
/// what makes concurrent increments lose-free without locks.
#[derive(Debug)]
pub(crate) enum AggregatorOp {
    /// Add `delta` to the counter and broadcast the new value. A reply
    /// channel is attached when the caller wants the new count; the fast
    /// path sends none and never waits.
    Increment {
        delta: u64,
        reply: Option<oneshot::Sender<u64>>,
    },
    /// Register a live subscriber. The current count is pushed immediately
    /// so a reconnecting client starts from the present snapshot.
    Subscribe {
        sender: mpsc::UnboundedSender<u64>,
        reply: oneshot::Sender<u64>,
    },
    /// Remove a subscriber. Idempotent: unknown ids are ignored.
    Unsubscribe { subscriber_id: u64 },
}
