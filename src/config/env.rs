//! Configuration loading from the process environment.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{
    GatewayConfig, ObservabilityConfig, QueueConfig, ValidationOptions,
};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {key}")]
    MissingVar { key: &'static str },

    #[error("invalid value for {key}: {reason}")]
    InvalidVar { key: &'static str, reason: String },
}

/// Load and validate configuration from environment variables.
///
/// `RABBITMQ_URL` is required; startup aborts without it rather than
/// reaching a partially configured state. Everything else has a default.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let queue_url = require("RABBITMQ_URL")?;
    url::Url::parse(&queue_url).map_err(|e| ConfigError::InvalidVar {
        key: "RABBITMQ_URL",
        reason: e.to_string(),
    })?;

    let host: IpAddr = parse_or("HTTP_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
    let port: u16 = parse_or("HTTP_PORT", 9000)?;

    Ok(GatewayConfig {
        app_name: var_or("APP_NAME", "api-gateway"),
        bind_address: SocketAddr::new(host, port),
        queue: QueueConfig {
            url: queue_url,
            queue_name: var_or("QUEUE_NAME", "gateway-queue"),
            durable: parse_or("QUEUE_DURABLE", false)?,
            rpc_timeout_secs: parse_or("RPC_TIMEOUT_SECS", 30)?,
        },
        observability: ObservabilityConfig {
            log_level: var_or("LOG_LEVEL", "info"),
            metrics_enabled: parse_or("METRICS_ENABLED", false)?,
            metrics_address: parse_or(
                "METRICS_ADDRESS",
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9090),
            )?,
        },
        validation: ValidationOptions::default(),
    })
}

/// Read a variable, treating empty values as unset.
fn optional(key: &'static str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::MissingVar { key })
}

fn var_or(key: &'static str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so the scenarios run inside
    // a single test to avoid cross-test interference.
    #[test]
    fn broker_url_is_required_and_read() {
        std::env::remove_var("RABBITMQ_URL");
        let err = load_from_env().expect_err("must fail without RABBITMQ_URL");
        assert!(matches!(err, ConfigError::MissingVar { key: "RABBITMQ_URL" }));

        // Empty counts as unset.
        std::env::set_var("RABBITMQ_URL", "  ");
        assert!(load_from_env().is_err());

        // The URL must at least parse.
        std::env::set_var("RABBITMQ_URL", "not a url");
        assert!(matches!(
            load_from_env(),
            Err(ConfigError::InvalidVar { key: "RABBITMQ_URL", .. })
        ));

        std::env::set_var("RABBITMQ_URL", "amqp://broker:5672");
        let config = load_from_env().expect("complete environment");
        assert_eq!(config.queue.url, "amqp://broker:5672");
        assert_eq!(config.queue.queue_name, "gateway-queue");
        assert!(!config.queue.durable);
        assert_eq!(config.bind_address.port(), 9000);

        std::env::remove_var("RABBITMQ_URL");
    }

    #[test]
    fn garbage_values_are_rejected_with_the_offending_key() {
        std::env::set_var("GW_TEST_PORT", "not-a-port");
        let err = parse_or::<u16>("GW_TEST_PORT", 0).expect_err("garbage must not parse");
        assert!(err.to_string().contains("GW_TEST_PORT"));
        std::env::remove_var("GW_TEST_PORT");
    }
}
