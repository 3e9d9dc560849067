//! Delayed, at-least-once delivery channel between the redirect path and the
//! click consumer.
//!
//! The core owns the message contract (see
//! [`crate::domain::click_event::QueueMessage`]) and the delay semantics;
//! durable transport is an external collaborator behind [`ClickQueue`]. The
//! bundled [`memory::MemoryClickQueue`] provides in-process delivery with the
//! same semantics: delayed, at-least-once, retried with backoff, and
//! dead-lettered when a message can never be processed.

pub mod memory;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

pub use memory::{DelayedDelivery, MemoryClickQueue, spawn_delivery_workers};

/// Enqueue failures.
///
/// The redirect path never propagates these: a failed enqueue is logged and
/// counted, and the redirect proceeds unchanged.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

/// Producer side of the click-event queue.
///
/// `payload` is the serialized wire message; `delay` postpones delivery to
/// smooth downstream load and give destinations time to stabilize before
/// evaluation. Delivery is at-least-once: consumers must tolerate duplicates.
#[async_trait]
pub trait ClickQueue: Send + Sync {
    async fn enqueue(&self, payload: String, delay: Duration) -> Result<(), QueueError>;
}

/// Sink for messages that cannot be processed and must not be retried
/// indefinitely.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn publish(&self, payload: &str, reason: &str);
}

/// Dead-letter sink that records the loss in logs and metrics.
///
/// A durable dead-letter store belongs to the external queue collaborator;
/// in-process we keep the evidence observable.
pub struct LoggingDeadLetter;

#[async_trait]
impl DeadLetterSink for LoggingDeadLetter {
    async fn publish(&self, payload: &str, reason: &str) {
        metrics::counter!("clicks_dead_lettered_total").increment(1);
        error!(reason, payload, "click event dead-lettered");
    }
}
