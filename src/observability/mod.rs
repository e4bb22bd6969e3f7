//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, own listener)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; level from config, env override wins
//! - Request ID flows through all subsystems
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
