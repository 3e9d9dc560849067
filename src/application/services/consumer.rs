//! Click event consumer: the slow half of the pipeline.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace, warn};
use validator::Validate;

use crate::aggregator::AggregatorRegistry;
use crate::application::services::evaluation::{
    EvaluationScheduler, ScheduleOutcome, TriggerCandidate,
};
use crate::config::CounterPolicy;
use crate::domain::click_event::QueueMessage;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Message-level consumer result, split by how the delivery mechanism must
/// react.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// Transient failure; the message is redelivered with backoff.
    #[error("transient failure: {0}")]
    Retryable(String),
    /// Contract violation; the message goes to the dead-letter path and is
    /// never retried.
    #[error("malformed message: {0}")]
    Fatal(String),
}

impl ConsumeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

/// Drains the click queue: parses and validates the wire message, persists
/// the event exactly once at the storage layer, updates the live counter
/// when running in the confirmed tier, and hands the event to the evaluation
/// scheduler.
///
/// Persistence and scheduling are independent concerns: once the upsert
/// succeeds the message succeeds, and a scheduler failure is surfaced only
/// through logs and metrics rather than through redelivery.
pub struct ClickConsumer {
    clicks: Arc<dyn ClickRepository>,
    scheduler: Arc<EvaluationScheduler>,
    aggregators: Arc<AggregatorRegistry>,
    counter_policy: CounterPolicy,
}

impl ClickConsumer {
    pub fn new(
        clicks: Arc<dyn ClickRepository>,
        scheduler: Arc<EvaluationScheduler>,
        aggregators: Arc<AggregatorRegistry>,
        counter_policy: CounterPolicy,
    ) -> Self {
        Self {
            clicks,
            scheduler,
            aggregators,
            counter_policy,
        }
    }

    /// Processes one delivered message.
    ///
    /// Duplicates (same event id) succeed without a second stored record and
    /// without a second confirmed-tier counter update; the scheduler is still
    /// invoked and its cool-down absorbs the repetition.
    pub async fn on_message(&self, payload: &str) -> Result<(), ConsumeError> {
        let message: QueueMessage = serde_json::from_str(payload)
            .map_err(|e| ConsumeError::Fatal(format!("undecodable message: {e}")))?;
        let QueueMessage::LinkClick(event) = message;

        event
            .validate()
            .map_err(|e| ConsumeError::Fatal(format!("schema violation: {e}")))?;

        let click = NewClick::from(&event);
        let inserted = self.clicks.upsert(&click).await.map_err(|e| match e {
            AppError::Fatal { .. } | AppError::Validation { .. } => {
                ConsumeError::Fatal(e.to_string())
            }
            other => ConsumeError::Retryable(other.to_string()),
        })?;

        if inserted {
            metrics::counter!("clicks_persisted_total").increment(1);
            if self.counter_policy == CounterPolicy::Confirmed {
                self.aggregators.increment_detached(&event.account_id, 1);
            }
        } else {
            metrics::counter!("clicks_duplicate_total").increment(1);
            debug!(event_id = %event.id, "duplicate click delivery ignored");
        }

        // Trigger-level result, isolated from the message-level result: the
        // event is persisted either way, and a failed hand-off degrades to
        // assume-suppressed.
        match self
            .scheduler
            .maybe_schedule(TriggerCandidate::from(&event))
            .await
        {
            Ok(ScheduleOutcome::Scheduled) => {
                debug!(link_id = %event.link_id, "evaluation scheduled");
            }
            Ok(ScheduleOutcome::Suppressed(reason)) => {
                trace!(link_id = %event.link_id, ?reason, "evaluation suppressed");
            }
            Err(e) => {
                metrics::counter!("evaluations_failed_total").increment(1);
                warn!(
                    link_id = %event.link_id,
                    error = %e,
                    "evaluation scheduling failed, assuming suppressed"
                );
            }
        }

        Ok(())
    }
}
