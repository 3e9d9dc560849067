//! Handler for the live click-counter WebSocket stream.

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the verified account id, injected by the upstream
/// authentication collaborator.
pub const ACCOUNT_HEADER: &str = "x-account-id";

/// Streams live click counts for an account over a WebSocket.
///
/// # Endpoint
///
/// `GET /click-stream/{account_id}`
///
/// # Rejections
///
/// - **404 Not Found**: no verified account header, or it names a different
///   account than the path
/// - **426 Upgrade Required**: the caller did not request a WebSocket upgrade
///
/// # Protocol
///
/// After the upgrade the server pushes `{"newCount": <n>}` text frames: the
/// current snapshot first, then one frame per increment. No client payload
/// is consumed. Missed updates are not buffered for reconnecting clients;
/// they resume from the snapshot pushed on subscribe.
pub async fn click_stream_handler(
    Path(account_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let verified = headers
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match verified {
        Some(verified) if verified == account_id => {}
        _ => {
            return AppError::not_found("Account not identified", json!({})).into_response();
        }
    }

    let Ok(ws) = ws else {
        return StatusCode::UPGRADE_REQUIRED.into_response();
    };

    ws.on_upgrade(move |socket| stream_counts(socket, state, account_id))
}

async fn stream_counts(mut socket: WebSocket, state: AppState, account_id: String) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let subscriber_id = match state.aggregators.subscribe(&account_id, tx).await {
        Ok(id) => id,
        Err(e) => {
            warn!(%account_id, error = %e, "failed to subscribe click stream");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    debug!(%account_id, subscriber_id, "click stream opened");

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(count) => {
                    let frame = json!({ "newCount": count }).to_string();
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                // the worker dropped us (or retired); the client reconnects
                None => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // no client-to-server payload is part of the protocol
                Some(Ok(_)) => {}
            },
        }
    }

    state.aggregators.unsubscribe(&account_id, subscriber_id).await;
    debug!(%account_id, subscriber_id, "click stream closed");
}
