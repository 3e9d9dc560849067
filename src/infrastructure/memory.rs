//! In-memory repository implementations.
//!
//! Used as substitutable fakes in tests and for queue-less local runs. Each
//! implementation holds its data behind an async `RwLock`; none of them is
//! meant to survive a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::{NewClick, RoutingInfo};
use crate::domain::repositories::{ClickRepository, CounterSnapshotRepository, LinkRepository};
use crate::error::AppError;

/// In-memory link store.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: RwLock<HashMap<String, RoutingInfo>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a link's routing configuration.
    pub async fn insert(&self, link_id: impl Into<String>, info: RoutingInfo) {
        self.links.write().await.insert(link_id.into(), info);
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn get_routing_info(&self, link_id: &str) -> Result<Option<RoutingInfo>, AppError> {
        Ok(self.links.read().await.get(link_id).cloned())
    }
}

/// In-memory click record store keyed by event id.
#[derive(Default)]
pub struct MemoryClickRepository {
    clicks: RwLock<HashMap<String, NewClick>>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.clicks.read().await.len()
    }

    /// Returns the stored record for an event id, if any.
    pub async fn get(&self, event_id: &str) -> Option<NewClick> {
        self.clicks.read().await.get(event_id).cloned()
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn upsert(&self, click: &NewClick) -> Result<bool, AppError> {
        let mut clicks = self.clicks.write().await;
        if clicks.contains_key(&click.event_id) {
            return Ok(false);
        }
        clicks.insert(click.event_id.clone(), click.clone());
        Ok(true)
    }
}

/// In-memory counter snapshot store.
#[derive(Default)]
pub struct MemoryCounterRepository {
    counters: RwLock<HashMap<String, u64>>,
}

impl MemoryCounterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterSnapshotRepository for MemoryCounterRepository {
    async fn load(&self, account_id: &str) -> Result<u64, AppError> {
        Ok(self
            .counters
            .read()
            .await
            .get(account_id)
            .copied()
            .unwrap_or(0))
    }

    async fn store(&self, account_id: &str, count: u64) -> Result<(), AppError> {
        self.counters
            .write()
            .await
            .insert(account_id.to_string(), count);
        Ok(())
    }
}
