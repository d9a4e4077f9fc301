use tracing_subscriber::EnvFilter;

use scribblehub_server::config::ServerConfig;
use scribblehub_server::{build_app, spawn_idle_room_cleanup};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load();
    config.validate();
    let listen_addr = config.listen_addr.clone();

    let (app, state) = build_app(config);

    spawn_idle_room_cleanup(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {listen_addr}: {e}"));

    tracing::info!("scribblehub server listening on {listen_addr}");

    axum::serve(listener, app).await.expect("server error");
}
