//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, queue and worker wiring, and the Axum
//! server lifecycle, including the shutdown drain that persists live
//! counters.

use crate::aggregator::AggregatorRegistry;
use crate::application::services::evaluation::LoggingEvaluationLauncher;
use crate::application::services::{
    ClickConsumer, ClickProducer, EvaluationScheduler, LinkResolver,
};
use crate::config::Config;
use crate::infrastructure::persistence::{
    PgClickRepository, PgCounterRepository, PgLinkRepository,
};
use crate::queue::{LoggingDeadLetter, MemoryClickQueue, spawn_delivery_workers};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Click queue and delivery workers
/// - Aggregator registry
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let pool = Arc::new(pool);
    let links = Arc::new(PgLinkRepository::new(pool.clone()));
    let clicks = Arc::new(PgClickRepository::new(pool.clone()));
    let counters = Arc::new(PgCounterRepository::new(pool.clone()));

    let aggregators = Arc::new(AggregatorRegistry::new(
        counters,
        config.aggregator_inbox_capacity,
        config.aggregator_idle(),
    ));

    let scheduler = Arc::new(EvaluationScheduler::new(
        config.evaluation_cooldown(),
        Arc::new(LoggingEvaluationLauncher),
    )?);

    let consumer = Arc::new(ClickConsumer::new(
        clicks,
        scheduler,
        aggregators.clone(),
        config.counter_policy,
    ));

    let (queue, delivery_rx) = MemoryClickQueue::new(config.queue_capacity);
    let _delivery = spawn_delivery_workers(
        delivery_rx,
        consumer,
        config.consumer_concurrency,
        Arc::new(LoggingDeadLetter),
    );
    tracing::info!("Click delivery workers started");

    let producer = Arc::new(ClickProducer::new(Arc::new(queue), config.queue_delay()));
    let resolver = Arc::new(LinkResolver::new(links));

    let state = AppState::new(
        resolver,
        producer,
        aggregators.clone(),
        config.counter_policy,
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Persist every live counter before the process exits; in-flight delayed
    // deliveries are process-local and die with it.
    tracing::info!("Draining aggregator workers");
    aggregators.drain().await;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to install shutdown signal handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
