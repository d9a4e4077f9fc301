use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use scribblehub_core::net::protocol::{decode_client_event, MAX_MESSAGE_SIZE};
use scribblehub_core::player::UserId;

use crate::router::Router;
use crate::state::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Every accepted connection gets a fresh [`UserId`], good for the lifetime
/// of the socket — room membership and game identity are both keyed on it,
/// and it is never reused across a reconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = UserId::new_v4();
    let router = Router::new(state.clone());

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    router.connect(conn_id, tx).await;
    state
        .ws_connection_count
        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        if text.len() > MAX_MESSAGE_SIZE {
            tracing::debug!(%conn_id, size = text.len(), "oversized frame dropped");
            continue;
        }

        match decode_client_event(&text) {
            Ok(event) => router.dispatch(conn_id, event).await,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "malformed frame dropped");
            },
        }
    }

    writer.abort();
    router.disconnect(conn_id).await;
    state
        .ws_connection_count
        .fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
}
