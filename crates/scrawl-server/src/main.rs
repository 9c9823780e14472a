use std::net::SocketAddr;
use std::sync::Arc;

use scrawl_server::registry::RoomRegistry;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrawl_server=info,tower_http=info".into()),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let registry = Arc::new(RoomRegistry::new());
    let app = scrawl_server::app(registry);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("scrawl room server listening on {addr}");
    info!("websocket endpoint: ws://localhost:{port}/ws");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
