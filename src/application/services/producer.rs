//! Fire-and-forget click event dispatch.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::click_event::{ClickEvent, QueueMessage};
use crate::queue::ClickQueue;

/// Produces click events onto the delivery queue from the redirect fast path.
///
/// Dispatch is non-blocking by contract: the caller hands off the event and
/// immediately proceeds. Enqueue success or failure is observed only through
/// logs and the `clicks_dropped_total` counter, never through the caller's
/// control flow, so a dead queue cannot slow down or fail a redirect.
pub struct ClickProducer {
    queue: Arc<dyn ClickQueue>,
    delay: Duration,
}

impl ClickProducer {
    /// Creates a producer that enqueues with the given fixed delivery delay.
    pub fn new(queue: Arc<dyn ClickQueue>, delay: Duration) -> Self {
        Self { queue, delay }
    }

    /// Serializes the event and enqueues it in a detached task.
    ///
    /// Already-dispatched events are never retracted, even if the originating
    /// request is cancelled mid-flight.
    pub fn dispatch(&self, event: ClickEvent) {
        let queue = Arc::clone(&self.queue);
        let delay = self.delay;
        let event_id = event.id.clone();

        let payload = match serde_json::to_string(&QueueMessage::LinkClick(event)) {
            Ok(payload) => payload,
            Err(e) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(%event_id, error = %e, "failed to serialize click event");
                return;
            }
        };

        tokio::spawn(async move {
            if let Err(e) = queue.enqueue(payload, delay).await {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(%event_id, error = %e, "failed to enqueue click event");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::queue::QueueError;

    pub(crate) struct CapturingQueue {
        pub accepted: Mutex<Vec<(String, Duration)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ClickQueue for CapturingQueue {
        async fn enqueue(&self, payload: String, delay: Duration) -> Result<(), QueueError> {
            if self.fail {
                return Err(QueueError::Unavailable("closed".to_string()));
            }
            self.accepted.lock().await.push((payload, delay));
            Ok(())
        }
    }

    fn sample_event() -> ClickEvent {
        ClickEvent::new(
            "lnk1".to_string(),
            "acct1".to_string(),
            "https://example.com".to_string(),
            "US".to_string(),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_dispatch_enqueues_with_configured_delay() {
        let queue = Arc::new(CapturingQueue {
            accepted: Mutex::new(Vec::new()),
            fail: false,
        });
        let producer = ClickProducer::new(queue.clone(), Duration::from_secs(600));

        producer.dispatch(sample_event());

        // the enqueue runs in a detached task
        for _ in 0..100 {
            if !queue.accepted.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let accepted = queue.accepted.lock().await;
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].1, Duration::from_secs(600));
        assert!(accepted[0].0.contains("\"type\":\"LINK_CLICK\""));
    }

    #[tokio::test]
    async fn test_dispatch_swallows_enqueue_failure() {
        let queue = Arc::new(CapturingQueue {
            accepted: Mutex::new(Vec::new()),
            fail: true,
        });
        let producer = ClickProducer::new(queue.clone(), Duration::from_secs(600));

        // must not panic or surface the failure
        producer.dispatch(sample_event());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(queue.accepted.lock().await.is_empty());
    }
}
