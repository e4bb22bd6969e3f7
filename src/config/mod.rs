//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (+ optional .env file)
//!     → env.rs (read & parse variables)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - Required variables fail startup instead of falling back to defaults
//! - Optional fields all have defaults to allow a minimal environment

pub mod env;
pub mod schema;

pub use env::{load_from_env, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ObservabilityConfig;
pub use schema::QueueConfig;
pub use schema::ValidationOptions;
