//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, /api prefix)
//!     → validation.rs (body decode: coerce, whitelist, type-check)
//!     → handler (built-in, or an externally mounted controller)
//!     → response (errors rendered by error.rs at the request boundary)
//! ```

pub mod handlers;
pub mod server;
pub mod validation;

pub use server::{build_router, AppState, HttpServer};
pub use validation::{Decode, FieldKind, FieldSpec, ValidatedJson};
