use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use scribblehub_server::config::ServerConfig;
use scribblehub_server::{build_app, spawn_idle_room_cleanup};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    _server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);
        spawn_idle_room_cleanup(state);

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(20)).await;

        Self { addr, _server: server }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

pub async fn ws_send(stream: &mut WsStream, event: &str, payload: Value) {
    let frame = serde_json::json!({ "event": event, "payload": payload }).to_string();
    stream.send(Message::Text(frame.into())).await.unwrap();
}

/// Reads the next text frame, decoded as `{event, payload}` JSON (5s timeout).
pub async fn ws_recv(stream: &mut WsStream) -> Value {
    let deadline = Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Close(_))) => panic!("WebSocket closed unexpectedly"),
                Some(Err(e)) => panic!("WebSocket error: {e}"),
                None => panic!("WebSocket stream ended"),
                _ => continue,
            }
        }
    })
    .await
    .expect("timed out waiting for a frame")
}

/// Like [`ws_recv`] but returns `None` on timeout instead of panicking — for
/// asserting that a message was *not* sent to a given connection.
pub async fn ws_try_recv(stream: &mut WsStream, timeout_ms: u64) -> Option<Value> {
    let deadline = Duration::from_millis(timeout_ms);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => panic!("WebSocket error or closed"),
                _ => continue,
            }
        }
    })
    .await
    .ok()
}

/// Sends `create-room` and returns the decoded `room-created` payload.
pub async fn create_room(stream: &mut WsStream, room_name: &str, username: &str) -> Value {
    ws_send(
        stream,
        "create-room",
        serde_json::json!({ "roomName": room_name, "username": username }),
    )
    .await;
    let msg = ws_recv(stream).await;
    assert_eq!(msg["event"], "room-created");
    msg["payload"].clone()
}

/// Sends `join-room` and returns the decoded `room-joined` payload.
pub async fn join_room(stream: &mut WsStream, room_id: &str, username: &str) -> Value {
    ws_send(
        stream,
        "join-room",
        serde_json::json!({ "roomId": room_id, "username": username }),
    )
    .await;
    let msg = ws_recv(stream).await;
    assert_eq!(msg["event"], "room-joined");
    msg["payload"].clone()
}
