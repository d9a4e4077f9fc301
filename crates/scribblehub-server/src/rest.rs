use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use scribblehub_core::net::messages::UserView;
use scribblehub_core::room::RoomId;

use crate::error::AppError;
use crate::room_manager::RoomSummary;
use crate::state::AppState;

/// One row of `GET /api/rooms`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListEntry {
    pub id: RoomId,
    pub name: String,
    pub user_count: usize,
    /// Seconds since the room was created — `Room::created_at` is a
    /// monotonic instant, not a wall-clock timestamp, so "age" is all a
    /// read-only snapshot can honestly report.
    pub created_at: u64,
}

impl From<RoomSummary> for RoomListEntry {
    fn from(s: RoomSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            user_count: s.user_count,
            created_at: s.created_at.elapsed().as_secs(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    pub id: RoomId,
    pub name: String,
    pub user_count: usize,
    pub created_at: u64,
    pub users: Vec<UserView>,
}

fn parse_room_id(raw: &str) -> Result<RoomId, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("'{raw}' is not a valid room id")))
}

pub async fn list_rooms(State(state): State<AppState>) -> Json<serde_json::Value> {
    let rooms = state.rooms.read().await;
    let entries: Vec<RoomListEntry> = rooms.list_rooms().into_iter().map(RoomListEntry::from).collect();
    Json(serde_json::json!({ "success": true, "rooms": entries }))
}

pub async fn get_room(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<Json<serde_json::Value>, AppError> {
    let room_id = parse_room_id(&raw_id)?;
    let rooms = state.rooms.read().await;
    let room = rooms
        .room(room_id)
        .ok_or_else(|| AppError::NotFound(format!("room {room_id} not found")))?;

    let detail = RoomDetail {
        id: room.id,
        name: room.name.clone(),
        user_count: room.user_count(),
        created_at: room.created_at.elapsed().as_secs(),
        users: room.users().iter().map(UserView::from).collect(),
    };
    Ok(Json(serde_json::json!({ "success": true, "room": detail })))
}

pub async fn room_exists(State(state): State<AppState>, Path(raw_id): Path<String>) -> Result<Json<serde_json::Value>, AppError> {
    let room_id = parse_room_id(&raw_id)?;
    let rooms = state.rooms.read().await;
    Ok(Json(serde_json::json!({ "exists": rooms.room_exists(room_id) })))
}
