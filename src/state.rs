//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::aggregator::AggregatorRegistry;
use crate::application::services::{ClickProducer, LinkResolver};
use crate::config::CounterPolicy;

/// Handler-visible application state.
///
/// Every collaborator is injected here at startup; handlers never reach for
/// globals, so tests assemble the same struct from in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<LinkResolver>,
    pub producer: Arc<ClickProducer>,
    pub aggregators: Arc<AggregatorRegistry>,
    pub counter_policy: CounterPolicy,
}

impl AppState {
    pub fn new(
        resolver: Arc<LinkResolver>,
        producer: Arc<ClickProducer>,
        aggregators: Arc<AggregatorRegistry>,
        counter_policy: CounterPolicy,
    ) -> Self {
        Self {
            resolver,
            producer,
            aggregators,
            counter_policy,
        }
    }
}
