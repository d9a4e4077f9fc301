pub mod config;
pub mod error;
pub mod health;
pub mod rest;
pub mod room_manager;
pub mod router;
pub mod state;
pub mod ws;

use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let cors_origin = config.cors_origin.clone();
    let state = AppState::new(config);

    let cors = match cors_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new().allow_origin(value).allow_methods(Any).allow_headers(Any),
            Err(_) => {
                tracing::warn!(%origin, "cors_origin is not a valid header value, reflecting Any");
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            },
        },
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let api_routes = Router::new()
        .route("/rooms", axum::routing::get(rest::list_rooms))
        .route("/rooms/{id}", axum::routing::get(rest::get_room))
        .route("/rooms/{id}/exists", axum::routing::get(rest::room_exists));

    let app = Router::new()
        .route("/ws", axum::routing::get(ws::ws_handler))
        .route("/health", axum::routing::get(health::health_check))
        .route("/health/ready", axum::routing::get(health::readiness_check))
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state.clone());

    (app, state)
}

/// Background task that periodically removes rooms left empty past the
/// configured idle timeout.
pub fn spawn_idle_room_cleanup(state: AppState) {
    let check_interval = state.config.rooms.idle_check_interval_secs;
    let idle_timeout = state.config.rooms.idle_timeout_secs;
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(check_interval));
        let max_idle = Duration::from_secs(idle_timeout);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("idle room cleanup shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let mut rooms = state.rooms.write().await;
                    let removed = rooms.cleanup_idle_rooms(max_idle);
                    if removed > 0 {
                        tracing::info!(removed, "cleaned up idle rooms");
                    }
                }
            }
        }
    });
}
