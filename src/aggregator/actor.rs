//! The per-account counter worker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::AggregatorOp;
use super::registry::WorkerHandle;
use crate::domain::repositories::CounterSnapshotRepository;

/// Sequential owner of one account's live counter and subscriber set.
///
/// Lifecycle: created on first access with a baseline loaded from the
/// snapshot store (zero when none exists or the load fails), active while
/// operations arrive or subscribers are connected, retired after the idle
/// window. Retirement deregisters the worker, drains any operations that
/// raced into the inbox, and persists the final count so a later access
/// resumes from it.
pub(crate) struct CounterActor {
    account_id: String,
    generation: u64,
    inbox: mpsc::Receiver<AggregatorOp>,
    snapshots: Arc<dyn CounterSnapshotRepository>,
    workers: Arc<DashMap<String, WorkerHandle>>,
    idle_after: Duration,
    count: u64,
    last_click_at: Option<DateTime<Utc>>,
    subscribers: HashMap<u64, mpsc::UnboundedSender<u64>>,
    next_subscriber_id: u64,
}

impl CounterActor {
    pub(crate) fn new(
        account_id: String,
        generation: u64,
        inbox: mpsc::Receiver<AggregatorOp>,
        snapshots: Arc<dyn CounterSnapshotRepository>,
        workers: Arc<DashMap<String, WorkerHandle>>,
        idle_after: Duration,
    ) -> Self {
        Self {
            account_id,
            generation,
            inbox,
            snapshots,
            workers,
            idle_after,
            count: 0,
            last_click_at: None,
            subscribers: HashMap::new(),
            next_subscriber_id: 0,
        }
    }

    pub(crate) async fn run(mut self) {
        self.count = match self.snapshots.load(&self.account_id).await {
            Ok(baseline) => baseline,
            Err(e) => {
                warn!(account_id = %self.account_id, error = %e, "failed to load counter baseline, starting at zero");
                0
            }
        };

        loop {
            match tokio::time::timeout(self.idle_after, self.inbox.recv()).await {
                Ok(Some(op)) => self.handle(op),
                // all senders dropped: registry is draining for shutdown
                Ok(None) => break,
                // idle window elapsed; live subscribers keep the worker alive
                Err(_) if self.subscribers.is_empty() => break,
                Err(_) => {}
            }
        }

        self.retire().await;
    }

    fn handle(&mut self, op: AggregatorOp) {
        match op {
            AggregatorOp::Increment { delta, reply } => {
                self.count += delta;
                self.last_click_at = Some(Utc::now());
                self.broadcast();
                if let Some(reply) = reply {
                    let _ = reply.send(self.count);
                }
            }
            AggregatorOp::Subscribe { sender, reply } => {
                let subscriber_id = self.next_subscriber_id;
                self.next_subscriber_id += 1;
                // current snapshot first, live updates follow
                let _ = sender.send(self.count);
                self.subscribers.insert(subscriber_id, sender);
                let _ = reply.send(subscriber_id);
            }
            AggregatorOp::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
            }
        }
    }

    /// Pushes the current count to every subscriber, dropping the ones whose
    /// connection has gone away. One dead peer never aborts the rest.
    fn broadcast(&mut self) {
        let count = self.count;
        self.subscribers
            .retain(|_, sender| sender.send(count).is_ok());
    }

    async fn retire(mut self) {
        // Deregister first so no new sender can be handed out, then close the
        // inbox: a racing send either lands in the buffer (drained below) or
        // fails, making the registry respawn a fresh worker from the snapshot.
        self.workers
            .remove_if(&self.account_id, |_, handle| {
                handle.generation() == self.generation
            });
        self.inbox.close();
        while let Some(op) = self.inbox.recv().await {
            self.handle(op);
        }

        if let Err(e) = self.snapshots.store(&self.account_id, self.count).await {
            warn!(
                account_id = %self.account_id,
                count = self.count,
                error = %e,
                "failed to persist counter snapshot on eviction"
            );
        } else {
            debug!(
                account_id = %self.account_id,
                count = self.count,
                last_click_at = ?self.last_click_at,
                "counter worker retired"
            );
        }
    }
}
