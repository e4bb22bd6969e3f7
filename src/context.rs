//! Request-scoped context.
//!
//! # Responsibilities
//! - Open a per-request scope before any handler runs
//! - Carry the request ID and application name through handler call chains
//! - Give downstream integrations (e.g. database-transaction propagation)
//!   a well-known place to hang request-scoped state
//!
//! # Design Decisions
//! - Task-local storage instead of a process-global: the scope ends with the
//!   request and concurrent requests never observe each other
//! - The layer sits inside the request-id middleware, so the ID it captures
//!   is the one the response will carry

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

/// Context active for the duration of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub app_name: Arc<str>,
}

impl RequestContext {
    /// The context of the current task, if a request scope is active.
    pub fn current() -> Option<RequestContext> {
        REQUEST_CONTEXT.try_with(|ctx| ctx.clone()).ok()
    }

    /// Run `fut` inside this context.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: std::future::Future,
    {
        REQUEST_CONTEXT.scope(self, fut).await
    }
}

/// Middleware opening the request scope.
///
/// Expects `SetRequestIdLayer` to have run already; falls back to a fresh
/// UUID when the header is absent (e.g. in bare unit tests).
pub async fn propagate_context(
    State(app_name): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let ctx = RequestContext {
        request_id,
        app_name,
    };
    ctx.scope(next.run(request)).await
}
