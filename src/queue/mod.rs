//! Message queue transport subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → client.rs (emit / send over the gateway queue)
//!     → broker
//!     → consumer.rs (delivery → envelope → pattern dispatch)
//!     → registered handler
//!     → reply published to reply-to queue (request/response only)
//! ```
//!
//! # Design Decisions
//! - One connection, one channel, declared topology before any consumption
//! - The queue is non-durable by default: declaration and contents do not
//!   survive a broker restart (config makes the choice explicit)
//! - Every delivery is acked, including malformed and unroutable ones;
//!   at-least-once semantics end where the non-durable queue begins

pub mod client;
pub mod consumer;
pub mod envelope;
pub mod transport;

use thiserror::Error;

pub use client::QueueClient;
pub use consumer::{HandlerRegistry, QueueConsumer};
pub use envelope::{Envelope, ReplyEnvelope};
pub use transport::QueueTransport;

/// Error type for queue transport operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("broker connection failed: {0}")]
    Connect(#[source] lapin::Error),

    #[error("broker channel error: {0}")]
    Channel(#[source] lapin::Error),

    #[error("publish failed: {0}")]
    Publish(#[source] lapin::Error),

    #[error("consume failed: {0}")]
    Consume(#[source] lapin::Error),

    #[error("invalid message payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("no reply within {after_secs}s for pattern '{pattern}'")]
    RpcTimeout { pattern: String, after_secs: u64 },

    #[error("reply channel closed before a response arrived")]
    ReplyDropped,

    #[error("remote handler failed: {0}")]
    Remote(String),
}
