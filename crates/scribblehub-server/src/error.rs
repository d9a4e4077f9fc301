use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// The REST-surface error taxonomy: `BadRequest` on a malformed path
/// parameter, `NotFound` on a room that doesn't exist, `Internal` on
/// anything unexpected. The WebSocket surface never constructs this type —
/// its own failures are either an `error` event (create-room/join-room
/// only) or a silent drop, per the dispatch contract.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Internal(m) => write!(f, "{m}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            Self::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
        };
        (
            status,
            Json(serde_json::json!({ "success": false, "error": message })),
        )
            .into_response()
    }
}
