//! Structured logging initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::GatewayConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// gateway and its HTTP middleware. Must run before the application
/// container is built so construction-time events are captured.
pub fn init(config: &GatewayConfig) {
    let default_filter = format!(
        "api_gateway={level},tower_http={level}",
        level = config.observability.log_level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(app = %config.app_name, "logging initialized");
}
