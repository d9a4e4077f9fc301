use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::room_manager::RoomRegistry;

pub type SharedRoomRegistry = Arc<RwLock<RoomRegistry>>;

/// Shared application state, cloned into every Axum handler and every
/// background task. Cloning is cheap — everything inside is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub rooms: SharedRoomRegistry,
    pub config: Arc<ServerConfig>,
    pub ws_connection_count: Arc<AtomicUsize>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(RoomRegistry::new())),
            config: Arc::new(config),
            ws_connection_count: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
        }
    }
}
