//! Deferred destination-health evaluation scheduling.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use tracing::info;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;

/// A click that may warrant a fresh health evaluation of its link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerCandidate {
    pub link_id: String,
    pub account_id: String,
    pub click_event_id: String,
}

impl From<&ClickEvent> for TriggerCandidate {
    fn from(event: &ClickEvent) -> Self {
        Self {
            link_id: event.link_id.clone(),
            account_id: event.account_id.clone(),
            click_event_id: event.id.clone(),
        }
    }
}

/// An accepted evaluation hand-off: at most one exists per link within each
/// cool-down window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTrigger {
    pub link_id: String,
    pub account_id: String,
    pub click_event_id: String,
    pub scheduled_at: DateTime<Utc>,
}

/// Outcome of a scheduling decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    Suppressed(SuppressReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    CoolDownActive,
}

/// External workflow-execution collaborator that runs the actual destination
/// probe. The scheduler hands a trigger off and never awaits workflow
/// completion.
#[async_trait]
pub trait EvaluationLauncher: Send + Sync {
    async fn launch(&self, trigger: EvaluationTrigger) -> Result<(), AppError>;
}

/// Launcher used when no workflow executor is wired in: the hand-off is
/// recorded in the logs and nothing runs.
pub struct LoggingEvaluationLauncher;

#[async_trait]
impl EvaluationLauncher for LoggingEvaluationLauncher {
    async fn launch(&self, trigger: EvaluationTrigger) -> Result<(), AppError> {
        info!(
            link_id = %trigger.link_id,
            account_id = %trigger.account_id,
            click_event_id = %trigger.click_event_id,
            "evaluation workflow triggered"
        );
        Ok(())
    }
}

/// Decides, per link and per cool-down window, whether a health-evaluation
/// workflow should start.
///
/// The cool-down marker is a keyed rate limiter holding one permit per
/// cool-down period per link id. Taking the permit is an atomic
/// check-and-set, so two consumers racing on the same link - in any arrival
/// order - produce exactly one `Scheduled`.
pub struct EvaluationScheduler {
    gate: DefaultKeyedRateLimiter<String>,
    launcher: Arc<dyn EvaluationLauncher>,
}

impl EvaluationScheduler {
    /// Creates a scheduler enforcing the given cool-down between evaluations
    /// of the same link.
    pub fn new(
        cool_down: Duration,
        launcher: Arc<dyn EvaluationLauncher>,
    ) -> Result<Self, AppError> {
        let quota = Quota::with_period(cool_down).ok_or_else(|| {
            AppError::internal("Evaluation cool-down must be non-zero", json!({}))
        })?;

        Ok(Self {
            gate: RateLimiter::keyed(quota),
            launcher,
        })
    }

    /// Schedules an evaluation unless one already ran for this link within
    /// the cool-down window.
    ///
    /// # Errors
    ///
    /// An `Err` means the hand-off to the workflow collaborator failed after
    /// the permit was taken. Callers degrade this to assume-suppressed: the
    /// window stays consumed, favoring under-evaluation over duplicate
    /// expensive probes.
    pub async fn maybe_schedule(
        &self,
        candidate: TriggerCandidate,
    ) -> Result<ScheduleOutcome, AppError> {
        if self.gate.check_key(&candidate.link_id).is_err() {
            metrics::counter!("evaluations_suppressed_total").increment(1);
            return Ok(ScheduleOutcome::Suppressed(SuppressReason::CoolDownActive));
        }

        let trigger = EvaluationTrigger {
            link_id: candidate.link_id,
            account_id: candidate.account_id,
            click_event_id: candidate.click_event_id,
            scheduled_at: Utc::now(),
        };

        self.launcher.launch(trigger).await?;
        metrics::counter!("evaluations_scheduled_total").increment(1);

        Ok(ScheduleOutcome::Scheduled)
    }
}
