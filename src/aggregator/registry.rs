//! Account id to worker mapping with create-on-miss and idle eviction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use super::AggregatorOp;
use super::actor::CounterActor;
use crate::domain::repositories::CounterSnapshotRepository;
use crate::error::AppError;

/// Attempts to reach a worker before giving up; a lost race with a retiring
/// worker is resolved by respawning, which happens on the next attempt.
const MAX_SEND_ATTEMPTS: u32 = 3;

pub(crate) struct WorkerHandle {
    generation: u64,
    tx: mpsc::Sender<AggregatorOp>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

/// Registry of per-account counter workers.
///
/// Lookups create a worker on miss; each worker retires itself after the
/// idle window, so the map only holds accounts with recent activity. The
/// inbox is bounded: when a worker falls behind, detached increments are
/// rejected (and counted) rather than queued without limit.
pub struct AggregatorRegistry {
    workers: Arc<DashMap<String, WorkerHandle>>,
    snapshots: Arc<dyn CounterSnapshotRepository>,
    inbox_capacity: usize,
    idle_after: Duration,
    generations: AtomicU64,
}

impl AggregatorRegistry {
    pub fn new(
        snapshots: Arc<dyn CounterSnapshotRepository>,
        inbox_capacity: usize,
        idle_after: Duration,
    ) -> Self {
        Self {
            workers: Arc::new(DashMap::new()),
            snapshots,
            inbox_capacity,
            idle_after,
            generations: AtomicU64::new(0),
        }
    }

    /// Adds `delta` to the account's live counter and returns the new value.
    ///
    /// Serialized with every other operation for the same account. Blocks on
    /// a full inbox, which bounds memory under bursts.
    pub async fn increment(&self, account_id: &str, delta: u64) -> Result<u64, AppError> {
        for _ in 0..MAX_SEND_ATTEMPTS {
            let tx = self.sender_for(account_id);
            let (reply_tx, reply_rx) = oneshot::channel();
            let op = AggregatorOp::Increment {
                delta,
                reply: Some(reply_tx),
            };

            if tx.send(op).await.is_err() {
                // worker retired between lookup and send
                self.remove_closed(account_id);
                continue;
            }

            match reply_rx.await {
                Ok(count) => return Ok(count),
                Err(_) => continue,
            }
        }

        Err(AppError::internal(
            "Aggregator worker unavailable",
            json!({ "account_id": account_id }),
        ))
    }

    /// Fire-and-forget increment for the redirect fast path.
    ///
    /// Never suspends the caller: a full inbox rejects the update (logged
    /// and counted) instead of blocking or queueing unboundedly.
    pub fn increment_detached(&self, account_id: &str, delta: u64) {
        for _ in 0..MAX_SEND_ATTEMPTS {
            let tx = self.sender_for(account_id);
            match tx.try_send(AggregatorOp::Increment { delta, reply: None }) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    metrics::counter!("aggregator_backpressure_total").increment(1);
                    warn!(account_id, "aggregator inbox full, dropping live increment");
                    return;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.remove_closed(account_id);
                }
            }
        }

        warn!(account_id, "aggregator worker unavailable, dropping live increment");
    }

    /// Registers a live subscriber for an account's counter updates.
    ///
    /// The current count is pushed into `sender` immediately; every
    /// subsequent increment pushes the new value. Returns the subscriber id
    /// used for [`Self::unsubscribe`].
    pub async fn subscribe(
        &self,
        account_id: &str,
        sender: mpsc::UnboundedSender<u64>,
    ) -> Result<u64, AppError> {
        for _ in 0..MAX_SEND_ATTEMPTS {
            let tx = self.sender_for(account_id);
            let (reply_tx, reply_rx) = oneshot::channel();
            let op = AggregatorOp::Subscribe {
                sender: sender.clone(),
                reply: reply_tx,
            };

            if tx.send(op).await.is_err() {
                self.remove_closed(account_id);
                continue;
            }

            match reply_rx.await {
                Ok(subscriber_id) => return Ok(subscriber_id),
                Err(_) => continue,
            }
        }

        Err(AppError::internal(
            "Aggregator worker unavailable",
            json!({ "account_id": account_id }),
        ))
    }

    /// Removes a subscriber. Idempotent; a worker that already retired has
    /// no subscribers left to remove.
    pub async fn unsubscribe(&self, account_id: &str, subscriber_id: u64) {
        let tx = self
            .workers
            .get(account_id)
            .map(|handle| handle.tx.clone());

        if let Some(tx) = tx {
            let _ = tx.send(AggregatorOp::Unsubscribe { subscriber_id }).await;
        }
    }

    /// Number of live workers. Exposed for observability and tests.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Retires every worker, persisting each final counter value. Called on
    /// graceful shutdown.
    pub async fn drain(&self) {
        let accounts: Vec<String> = self.workers.iter().map(|e| e.key().clone()).collect();

        for account_id in accounts {
            if let Some((_, handle)) = self.workers.remove(&account_id) {
                let WorkerHandle { tx, join, .. } = handle;
                drop(tx);
                if join.await.is_err() {
                    warn!(account_id, "counter worker panicked during drain");
                }
            }
        }
    }

    /// Returns a sender for the account's worker, spawning one on miss.
    ///
    /// The map guard is released before the caller awaits anything.
    fn sender_for(&self, account_id: &str) -> mpsc::Sender<AggregatorOp> {
        self.workers
            .entry(account_id.to_string())
            .or_insert_with(|| self.spawn_worker(account_id))
            .tx
            .clone()
    }

    fn spawn_worker(&self, account_id: &str) -> WorkerHandle {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inbox_capacity);
        let actor = CounterActor::new(
            account_id.to_string(),
            generation,
            rx,
            Arc::clone(&self.snapshots),
            Arc::clone(&self.workers),
            self.idle_after,
        );

        WorkerHandle {
            generation,
            tx,
            join: tokio::spawn(actor.run()),
        }
    }

    fn remove_closed(&self, account_id: &str) {
        self.workers
            .remove_if(account_id, |_, handle| handle.tx.is_closed());
    }
}
