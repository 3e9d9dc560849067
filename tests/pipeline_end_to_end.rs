mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use axum_test::TestServer;
use tokio::sync::mpsc;

use geolink::api::handlers::redirect_handler;
use geolink::application::services::{ClickProducer, LinkResolver};
use geolink::config::CounterPolicy;
use geolink::domain::click_event::{ClickEvent, QueueMessage};
use geolink::infrastructure::memory::MemoryLinkRepository;
use geolink::queue::{ClickQueue, LoggingDeadLetter, MemoryClickQueue, spawn_delivery_workers};
use geolink::state::AppState;

use common::{TestPipeline, insert_link, test_pipeline};

struct LiveApp {
    server: TestServer,
    queue: MemoryClickQueue,
    pipeline: TestPipeline,
}

/// Assembles the full pipeline with an in-process queue and a short
/// delivery delay.
async fn live_app(cool_down: Duration, delay: Duration) -> LiveApp {
    let pipeline = test_pipeline(CounterPolicy::Optimistic, cool_down);

    let (queue, rx) = MemoryClickQueue::new(1024);
    let _workers = spawn_delivery_workers(
        rx,
        pipeline.consumer.clone(),
        4,
        Arc::new(LoggingDeadLetter),
    );

    let links = Arc::new(MemoryLinkRepository::new());
    insert_link(
        &links,
        "dAd5d",
        "acct-42",
        vec![],
        "https://example.com/fallback",
    )
    .await;

    let state = AppState::new(
        Arc::new(LinkResolver::new(links)),
        Arc::new(ClickProducer::new(Arc::new(queue.clone()), delay)),
        pipeline.aggregators.clone(),
        CounterPolicy::Optimistic,
    );

    let server = TestServer::new(
        Router::new()
            .route("/{link_id}", get(redirect_handler))
            .with_state(state),
    )
    .unwrap();

    LiveApp {
        server,
        queue,
        pipeline,
    }
}

#[tokio::test]
async fn test_click_flows_from_redirect_to_record_and_trigger() {
    let app = live_app(Duration::from_secs(3600), Duration::from_millis(50)).await;

    let response = app
        .server
        .get("/dAd5d")
        .add_header("x-geo-country", "US")
        .await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/fallback");

    // once the delivery delay elapses: exactly one persisted record and,
    // with no prior trigger in the window, exactly one evaluation trigger
    assert_eq!(app.pipeline.launcher.wait_for(1).await, 1);
    assert_eq!(app.pipeline.clicks.len().await, 1);

    let launched = app.pipeline.launcher.launched.lock().await;
    assert_eq!(launched[0].link_id, "dAd5d");
    assert_eq!(launched[0].account_id, "acct-42");

    let record = app
        .pipeline
        .clicks
        .get(&launched[0].click_event_id)
        .await
        .expect("click record stored");
    assert_eq!(record.link_code, "dAd5d");
    assert_eq!(record.account_id, "acct-42");
    assert_eq!(record.destination, "https://example.com/fallback");
    assert_eq!(record.country, "US");
}

#[tokio::test]
async fn test_duplicate_delivery_neither_double_counts_nor_retriggers() {
    let app = live_app(Duration::from_secs(3600), Duration::from_millis(20)).await;

    app.server
        .get("/dAd5d")
        .add_header("x-geo-country", "US")
        .await;
    assert_eq!(app.pipeline.launcher.wait_for(1).await, 1);

    // redeliver the same event id by hand, as an at-least-once queue may
    let event_id = app.pipeline.launcher.launched.lock().await[0]
        .click_event_id
        .clone();
    let mut event = ClickEvent::new(
        "dAd5d".to_string(),
        "acct-42".to_string(),
        "https://example.com/fallback".to_string(),
        "US".to_string(),
        None,
        None,
    );
    event.id = event_id;
    let payload = serde_json::to_string(&QueueMessage::LinkClick(event)).unwrap();
    app.queue
        .enqueue(payload, Duration::from_millis(10))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(app.pipeline.clicks.len().await, 1);
    assert_eq!(app.pipeline.launcher.launched.lock().await.len(), 1);
}

#[tokio::test]
async fn test_cool_down_expiry_allows_second_trigger() {
    let app = live_app(Duration::from_millis(200), Duration::from_millis(10)).await;

    app.server
        .get("/dAd5d")
        .add_header("x-geo-country", "US")
        .await;
    assert_eq!(app.pipeline.launcher.wait_for(1).await, 1);

    tokio::time::sleep(Duration::from_millis(250)).await;

    app.server
        .get("/dAd5d")
        .add_header("x-geo-country", "DE")
        .await;
    assert_eq!(app.pipeline.launcher.wait_for(2).await, 2);

    // both clicks persisted as distinct events
    assert_eq!(app.pipeline.clicks.len().await, 2);
}

#[tokio::test]
async fn test_subscriber_sees_live_counts_for_redirects() {
    let app = live_app(Duration::from_secs(3600), Duration::from_millis(10)).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.pipeline
        .aggregators
        .subscribe("acct-42", tx)
        .await
        .unwrap();
    assert_eq!(rx.recv().await, Some(0));

    app.server
        .get("/dAd5d")
        .add_header("x-geo-country", "US")
        .await;
    assert_eq!(rx.recv().await, Some(1));

    app.server
        .get("/dAd5d")
        .add_header("x-geo-country", "FR")
        .await;
    assert_eq!(rx.recv().await, Some(2));
}
