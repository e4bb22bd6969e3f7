//! Built-in gateway endpoints.

use axum::extract::State;
use axum::Json;

use crate::http::server::AppState;

/// Liveness probe. Unauthenticated, outside the `/api` prefix, and
/// independent of queue connectivity.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Gateway process is alive", body = String, content_type = "text/plain")
    )
)]
pub async fn health() -> &'static str {
    "OK"
}

/// The OpenAPI document, generated once at startup from the registered
/// route set and served read-only.
#[utoipa::path(
    get,
    path = "/api/docs",
    tag = "docs",
    responses(
        (status = 200, description = "OpenAPI description of the gateway surface", content_type = "application/json")
    )
)]
pub async fn docs(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    Json((*state.docs).clone())
}
