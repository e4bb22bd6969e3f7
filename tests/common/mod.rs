//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use api_gateway::{build_router, AppState, GatewayConfig};
use axum::Router;
use tokio::net::TcpListener;

/// Spawn the gateway router on an ephemeral port, without a broker.
pub async fn spawn_gateway() -> SocketAddr {
    let state = AppState::new(Arc::new(GatewayConfig::default()), None);
    spawn_router(build_router(state)).await
}

/// Spawn an arbitrary router on an ephemeral port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
