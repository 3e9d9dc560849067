//! In-process delayed delivery queue.
//!
//! A bounded intake channel decouples producers from delivery entirely: the
//! enqueue side never waits for consumers. Each accepted message sleeps out
//! its delivery delay in its own task, then competes for one of a fixed
//! number of delivery permits, so consumer concurrency stays bounded while
//! delay timers do not serialize behind one another.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::{ClickQueue, DeadLetterSink, QueueError};
use crate::application::services::consumer::{ClickConsumer, ConsumeError};

/// Delivery attempts per message before a retryable failure is given up on.
const MAX_DELIVERY_ATTEMPTS: usize = 5;

/// A message accepted by the queue, waiting out its delivery delay.
#[derive(Debug, Clone)]
pub struct DelayedDelivery {
    pub payload: String,
    pub delay: Duration,
}

/// Producer handle of the in-process queue.
///
/// Cloneable and cheap; `enqueue` is non-blocking and fails fast with
/// [`QueueError::Unavailable`] when the intake buffer is full or the
/// delivery side has shut down.
#[derive(Clone)]
pub struct MemoryClickQueue {
    tx: mpsc::Sender<DelayedDelivery>,
}

impl MemoryClickQueue {
    /// Creates the queue with a bounded intake buffer, returning the producer
    /// handle and the receiver to hand to [`spawn_delivery_workers`].
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DelayedDelivery>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ClickQueue for MemoryClickQueue {
    async fn enqueue(&self, payload: String, delay: Duration) -> Result<(), QueueError> {
        self.tx
            .try_send(DelayedDelivery { payload, delay })
            .map_err(|e| QueueError::Unavailable(e.to_string()))
    }
}

/// Spawns the delivery side of the queue.
///
/// Retryable consumer errors are redelivered with jittered exponential
/// backoff up to [`MAX_DELIVERY_ATTEMPTS`]; fatal errors and exhausted
/// retries go to the dead-letter sink. Delivery stops when every producer
/// handle has been dropped and the buffer is drained.
pub fn spawn_delivery_workers(
    mut rx: mpsc::Receiver<DelayedDelivery>,
    consumer: Arc<ClickConsumer>,
    concurrency: usize,
    dead_letters: Arc<dyn DeadLetterSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));

        while let Some(delivery) = rx.recv().await {
            let consumer = Arc::clone(&consumer);
            let dead_letters = Arc::clone(&dead_letters);
            let permits = Arc::clone(&permits);

            tokio::spawn(async move {
                tokio::time::sleep(delivery.delay).await;

                let _permit = match permits.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                deliver(&consumer, dead_letters.as_ref(), &delivery.payload).await;
            });
        }

        debug!("click queue delivery loop stopped");
    })
}

async fn deliver(consumer: &ClickConsumer, dead_letters: &dyn DeadLetterSink, payload: &str) {
    let backoff = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(MAX_DELIVERY_ATTEMPTS - 1);

    let result = RetryIf::spawn(
        backoff,
        || consumer.on_message(payload),
        |e: &ConsumeError| e.is_retryable(),
    )
    .await;

    match result {
        Ok(()) => {}
        Err(ConsumeError::Fatal(reason)) => {
            dead_letters.publish(payload, &reason).await;
        }
        Err(ConsumeError::Retryable(reason)) => {
            warn!(%reason, "click delivery retries exhausted");
            dead_letters.publish(payload, "delivery retries exhausted").await;
        }
    }
}
