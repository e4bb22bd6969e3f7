//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the built-in routes
//! - Mount every application route under the `/api` prefix
//! - Wire up middleware (tracing, request ID, CORS, context, timeout)
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - `/health` lives outside the prefix so orchestration probes keep a
//!   stable path regardless of API versioning
//! - The HTTP listener opens last in the bootstrap order, so no request is
//!   ever served before middleware and request context exist

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::GatewayConfig;
use crate::context::propagate_context;
use crate::docs::ApiDoc;
use crate::http::handlers;
use crate::observability::metrics;
use crate::queue::QueueClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
///
/// The queue client is optional so the HTTP surface (health, docs) stays
/// functional independent of broker connectivity.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub queue: Option<Arc<QueueClient>>,
    pub docs: Arc<utoipa::openapi::OpenApi>,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>, queue: Option<Arc<QueueClient>>) -> Self {
        Self {
            config,
            queue,
            docs: Arc::new(ApiDoc::openapi()),
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// Serve until the shutdown signal fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the router with all middleware layers.
///
/// Everything except `/health` nests under `/api`; requests outside the
/// prefix fall through to the default 404.
pub fn build_router(state: AppState) -> Router {
    let app_name: Arc<str> = Arc::from(state.config.app_name.as_str());
    let validation = state.config.validation.clone();

    let api = Router::new().route("/docs", get(handlers::docs));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn_with_state(app_name, propagate_context))
        .layer(cors_layer())
        .layer(Extension(validation))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Any origin, fixed method list, credentials allowed.
///
/// The origin is echoed rather than wildcarded: browsers reject
/// `Access-Control-Allow-Origin: *` on credentialed requests, and echoing
/// admits every origin all the same.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let response = next.run(request).await;

    metrics::record_http_request(method.as_str(), response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        build_router(AppState::new(Arc::new(GatewayConfig::default()), None))
    }

    #[tokio::test]
    async fn health_is_reachable_without_the_prefix() {
        let response = test_router()
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unprefixed_routes_fall_through_to_404() {
        let response = test_router()
            .oneshot(HttpRequest::get("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
