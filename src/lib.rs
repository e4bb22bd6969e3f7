//! API Gateway
//!
//! A single process terminating external HTTP and message-queue traffic in
//! front of the internal services, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌────────────────────────────────────────────────┐
//!                          │                  API GATEWAY                    │
//!                          │                                                 │
//!     HTTP Request         │  ┌─────────┐   ┌────────────┐   ┌──────────┐   │
//!     ─────────────────────┼─▶│  http   │──▶│ validation │──▶│ handlers │   │
//!                          │  │ server  │   │  pipeline  │   └────┬─────┘   │
//!                          │  └─────────┘   └────────────┘        │         │
//!                          │                                      ▼         │
//!                          │                               ┌──────────────┐ │
//!     Broker  ◀────────────┼───────────────────────────────│ queue client │ │
//!     (gateway-queue)      │                               │  emit / send │ │
//!                          │                               └──────────────┘ │
//!     Broker  ─────────────┼─▶┌──────────────┐   ┌──────────────────┐      │
//!     (deliveries)         │  │queue consumer│──▶│ handler registry │      │
//!                          │  └──────────────┘   └──────────────────┘      │
//!                          │                                                 │
//!                          │  ┌──────────────────────────────────────────┐  │
//!                          │  │           Cross-Cutting Concerns          │  │
//!                          │  │  ┌────────┐ ┌─────────┐ ┌─────────────┐  │  │
//!                          │  │  │ config │ │ context │ │observability│  │  │
//!                          │  │  └────────┘ └─────────┘ └─────────────┘  │  │
//!                          │  │  ┌─────────────────┐  ┌───────────────┐  │  │
//!                          │  │  │      docs       │  │   lifecycle   │  │  │
//!                          │  │  │ (OpenAPI, once) │  │ startup/stop  │  │  │
//!                          │  │  └─────────────────┘  └───────────────┘  │  │
//!                          │  └──────────────────────────────────────────┘  │
//!                          └────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod queue;

// Cross-cutting concerns
pub mod context;
pub mod docs;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use error::{ApiError, StartupError};
pub use http::{build_router, AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use queue::{HandlerRegistry, QueueClient, QueueConsumer, QueueTransport};
