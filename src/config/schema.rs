//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits so the config can be dumped for diagnostics.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway process.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Application name used in logs and the generated API documentation.
    pub app_name: String,

    /// HTTP listener bind address.
    pub bind_address: SocketAddr,

    /// Message queue transport settings.
    pub queue: QueueConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request validation behavior.
    pub validation: ValidationOptions,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_name: "api-gateway".to_string(),
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9000),
            queue: QueueConfig::default(),
            observability: ObservabilityConfig::default(),
            validation: ValidationOptions::default(),
        }
    }
}

/// Message queue transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Broker connection URL (e.g., "amqp://127.0.0.1:5672").
    pub url: String,

    /// Name of the queue the gateway publishes to and consumes from.
    pub queue_name: String,

    /// Whether the queue survives a broker restart.
    ///
    /// The gateway historically runs non-durable: queued messages are lost
    /// if the broker goes down. Kept as an explicit switch so operators own
    /// that trade-off.
    pub durable: bool,

    /// How long a request/response publish waits for a reply.
    pub rpc_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: "amqp://127.0.0.1:5672".to_string(),
            queue_name: "gateway-queue".to_string(),
            durable: false,
            rpc_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: SocketAddr,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9090),
        }
    }
}

/// Request body validation behavior.
///
/// Only structural validation runs at the gateway layer: type coercion,
/// unknown-field stripping, and (optionally) required-field checks.
/// Business-rule validation belongs to the downstream services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Coerce primitive values toward the declared field kind ("42" → 42).
    pub coerce_primitives: bool,

    /// Drop body fields that are not declared by the target type (whitelist).
    pub strip_unknown_fields: bool,

    /// Tolerate absent fields instead of enforcing `required` markers.
    pub skip_missing_properties: bool,

    /// Run custom business-rule validators at the gateway. Off: the gateway
    /// checks structure only and leaves domain rules to the services.
    pub run_custom_rules: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            coerce_primitives: true,
            strip_unknown_fields: true,
            skip_missing_properties: true,
            run_custom_rules: false,
        }
    }
}
