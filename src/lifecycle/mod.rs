//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → init logging/context → build container
//!     → attach queue transport → start consumer → open HTTP listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain HTTP → stop consumer
//!     → close broker connection → exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing listens half-configured
//! - Ordered startup: config first, listeners last
//! - Consumer starts before the HTTP listener so queue backlog drains
//!   against a fully constructed container

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
