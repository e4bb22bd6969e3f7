//! Process-wide error taxonomy.
//!
//! Two tiers, matching how failures propagate:
//! - [`StartupError`]: fatal bootstrap failures. Never caught; they surface
//!   through `main` as a non-zero exit before any listener opens.
//! - [`ApiError`]: per-request failures. Caught at the request boundary and
//!   translated into structured HTTP error responses; they never terminate
//!   the process or touch the queue consumer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::http::validation::DecodeError;
use crate::queue::QueueError;

/// Fatal errors during the bootstrap sequence.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

/// Request-boundary errors with an HTTP rendering.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] DecodeError),

    #[error("message broker unavailable")]
    QueueUnavailable,

    #[error("no response from upstream service for '{pattern}'")]
    UpstreamTimeout { pattern: String },

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("internal error: {context}")]
    Internal { context: String },
}

impl ApiError {
    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::QueueUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::QueueUnavailable => "queue_unavailable",
            ApiError::UpstreamTimeout { .. } => "upstream_timeout",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::RpcTimeout { pattern, .. } => ApiError::UpstreamTimeout { pattern },
            QueueError::Remote(reason) => ApiError::Upstream(reason),
            _ => ApiError::QueueUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_errors_map_to_gateway_statuses() {
        let timeout = ApiError::from(QueueError::RpcTimeout {
            pattern: "orders.create".to_string(),
            after_secs: 30,
        });
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let remote = ApiError::from(QueueError::Remote("boom".to_string()));
        assert_eq!(remote.status_code(), StatusCode::BAD_GATEWAY);
    }
}
