#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use geolink::aggregator::AggregatorRegistry;
use geolink::application::services::evaluation::{
    EvaluationLauncher, EvaluationScheduler, EvaluationTrigger,
};
use geolink::application::services::{ClickConsumer, ClickProducer, LinkResolver};
use geolink::config::CounterPolicy;
use geolink::domain::entities::{RoutingInfo, RoutingRule};
use geolink::error::AppError;
use geolink::infrastructure::memory::{
    MemoryClickRepository, MemoryCounterRepository, MemoryLinkRepository,
};
use geolink::queue::{ClickQueue, QueueError};
use geolink::state::AppState;

/// Queue fake that records what the producer hands off instead of
/// delivering it.
pub struct CapturingQueue {
    pub accepted: Mutex<Vec<(String, Duration)>>,
    pub fail: bool,
}

impl CapturingQueue {
    pub fn new() -> Self {
        Self {
            accepted: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn broken() -> Self {
        Self {
            accepted: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Waits until at least `n` messages were accepted, up to ~1s.
    pub async fn wait_for(&self, n: usize) -> usize {
        for _ in 0..200 {
            let len = self.accepted.lock().await.len();
            if len >= n {
                return len;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.accepted.lock().await.len()
    }
}

/// Launcher fake recording every evaluation hand-off.
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<EvaluationTrigger>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self {
            launched: Mutex::new(Vec::new()),
        }
    }

    pub async fn wait_for(&self, n: usize) -> usize {
        for _ in 0..200 {
            let len = self.launched.lock().await.len();
            if len >= n {
                return len;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.launched.lock().await.len()
    }
}

#[async_trait]
impl EvaluationLauncher for RecordingLauncher {
    async fn launch(&self, trigger: EvaluationTrigger) -> Result<(), AppError> {
        self.launched.lock().await.push(trigger);
        Ok(())
    }
}

#[async_trait]
impl ClickQueue for CapturingQueue {
    async fn enqueue(&self, payload: String, delay: Duration) -> Result<(), QueueError> {
        if self.fail {
            return Err(QueueError::Unavailable("queue disabled".to_string()));
        }
        self.accepted.lock().await.push((payload, delay));
        Ok(())
    }
}

/// Handler-level test fixture: real services over in-memory collaborators,
/// with the queue captured rather than consumed.
pub struct TestApp {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub queue: Arc<CapturingQueue>,
    pub aggregators: Arc<AggregatorRegistry>,
}

pub fn test_app(policy: CounterPolicy, queue: CapturingQueue) -> TestApp {
    let links = Arc::new(MemoryLinkRepository::new());
    let queue = Arc::new(queue);
    let aggregators = Arc::new(AggregatorRegistry::new(
        Arc::new(MemoryCounterRepository::new()),
        64,
        Duration::from_secs(60),
    ));

    let resolver = Arc::new(LinkResolver::new(links.clone()));
    let producer = Arc::new(ClickProducer::new(
        queue.clone(),
        Duration::from_secs(600),
    ));

    let state = AppState::new(resolver, producer, aggregators.clone(), policy);

    TestApp {
        state,
        links,
        queue,
        aggregators,
    }
}

pub async fn insert_link(
    links: &MemoryLinkRepository,
    link_id: &str,
    account_id: &str,
    rules: Vec<(&str, &str)>,
    default_destination: &str,
) {
    let rules = rules
        .into_iter()
        .map(|(country, destination)| RoutingRule {
            country: country.to_string(),
            destination: destination.to_string(),
        })
        .collect();

    links
        .insert(
            link_id,
            RoutingInfo::new(account_id, rules, default_destination),
        )
        .await;
}

/// Pipeline-level test fixture: a consumer over in-memory stores, wired for
/// direct `on_message` calls or a live in-process queue.
pub struct TestPipeline {
    pub clicks: Arc<MemoryClickRepository>,
    pub launcher: Arc<RecordingLauncher>,
    pub aggregators: Arc<AggregatorRegistry>,
    pub consumer: Arc<ClickConsumer>,
}

pub fn test_pipeline(policy: CounterPolicy, cool_down: Duration) -> TestPipeline {
    let clicks = Arc::new(MemoryClickRepository::new());
    let launcher = Arc::new(RecordingLauncher::new());
    let scheduler = Arc::new(
        EvaluationScheduler::new(cool_down, launcher.clone()).expect("non-zero cool-down"),
    );
    let aggregators = Arc::new(AggregatorRegistry::new(
        Arc::new(MemoryCounterRepository::new()),
        64,
        Duration::from_secs(60),
    ));

    let consumer = Arc::new(ClickConsumer::new(
        clicks.clone(),
        scheduler,
        aggregators.clone(),
        policy,
    ));

    TestPipeline {
        clicks,
        launcher,
        aggregators,
        consumer,
    }
}
