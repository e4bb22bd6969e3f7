//! Consume side of the queue transport.
//!
//! # Responsibilities
//! - Consume deliveries from the gateway queue
//! - Deserialize envelopes and dispatch by pattern to registered handlers
//! - Publish replies for request envelopes (`id` + `reply_to` present)
//! - Stop cleanly when the shutdown signal fires
//!
//! # Design Decisions
//! - Handlers are registered before consumption starts; the registry is
//!   frozen afterwards, so concurrent dispatch needs no locking
//! - Every delivery is acked: with a non-durable queue redelivery buys
//!   nothing, and unroutable messages would otherwise loop forever

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicPublishOptions};
use lapin::types::{FieldTable, ShortString};
use lapin::{BasicProperties, Channel};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::QueueConfig;
use crate::observability::metrics;
use crate::queue::envelope::{Envelope, ReplyEnvelope};
use crate::queue::transport::QueueTransport;
use crate::queue::QueueError;

/// Outcome of one pattern handler invocation.
pub type HandlerResult = Result<Value, Box<dyn std::error::Error + Send + Sync>>;

type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;
type Handler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// Pattern → handler map, populated at composition time.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a message pattern. Last registration wins.
    pub fn register<F, Fut>(&mut self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers
            .insert(pattern.into(), Arc::new(move |data| Box::pin(handler(data))));
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Run the handler registered for the envelope's pattern.
    ///
    /// `None` means no handler is registered for that pattern.
    pub async fn dispatch(&self, envelope: &Envelope) -> Option<HandlerResult> {
        let handler = self.handlers.get(&envelope.pattern)?;
        Some(handler(envelope.data.clone()).await)
    }
}

/// Consumer loop for the gateway queue.
pub struct QueueConsumer {
    channel: Channel,
    config: QueueConfig,
    registry: Arc<HandlerRegistry>,
}

impl QueueConsumer {
    pub fn new(transport: &QueueTransport, registry: HandlerRegistry) -> Self {
        Self {
            channel: transport.channel().clone(),
            config: transport.config().clone(),
            registry: Arc::new(registry),
        }
    }

    /// Activate the subscription and spawn the delivery loop.
    ///
    /// Returns once the subscription is live, so a consume failure is still
    /// a fatal startup error. Started before the HTTP listener so any
    /// backlog drains against a fully constructed container.
    pub async fn start(
        self,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<tokio::task::JoinHandle<()>, QueueError> {
        let deliveries = self
            .channel
            .basic_consume(
                &self.config.queue_name,
                "gateway-consumer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(QueueError::Consume)?;

        info!(
            queue = %self.config.queue_name,
            handlers = self.registry.len(),
            "queue consumer started"
        );

        Ok(tokio::spawn(self.run(deliveries, shutdown)))
    }

    async fn run(self, mut deliveries: lapin::Consumer, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("queue consumer stopping");
                    break;
                }
                delivery = deliveries.next() => {
                    match delivery {
                        Some(Ok(delivery)) => self.handle_delivery(delivery).await,
                        Some(Err(e)) => error!(error = %e, "queue consumer error"),
                        None => {
                            warn!("queue consumer stream ended");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_delivery(&self, delivery: Delivery) {
        metrics::record_queue_message("consumed");

        let envelope: Envelope = match serde_json::from_slice(&delivery.data) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "discarding malformed queue message");
                ack(&delivery).await;
                return;
            }
        };

        let outcome = self.registry.dispatch(&envelope).await;
        if outcome.is_none() {
            warn!(pattern = %envelope.pattern, "no handler registered for pattern");
        }

        let reply_to = delivery
            .properties
            .reply_to()
            .as_ref()
            .map(|q| q.as_str().to_string());

        match (&envelope.id, reply_to) {
            (Some(id), Some(reply_to)) => {
                let reply = match outcome {
                    Some(Ok(response)) => ReplyEnvelope::success(id.clone(), response),
                    Some(Err(e)) => ReplyEnvelope::failure(id.clone(), e.to_string()),
                    None => ReplyEnvelope::failure(
                        id.clone(),
                        format!("unknown pattern: {}", envelope.pattern),
                    ),
                };
                if let Err(e) = self.publish_reply(&reply_to, id, &reply).await {
                    error!(error = %e, pattern = %envelope.pattern, "failed to publish reply");
                }
            }
            _ => {
                if let Some(Err(e)) = outcome {
                    warn!(pattern = %envelope.pattern, error = %e, "event handler failed");
                }
            }
        }

        ack(&delivery).await;
    }

    async fn publish_reply(
        &self,
        reply_to: &str,
        correlation_id: &str,
        reply: &ReplyEnvelope,
    ) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(reply)?;
        self.channel
            .basic_publish(
                "",
                reply_to,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_content_type(ShortString::from("application/json"))
                    .with_correlation_id(ShortString::from(correlation_id.to_string())),
            )
            .await
            .map_err(QueueError::Publish)?
            .await
            .map_err(QueueError::Publish)?;

        metrics::record_queue_message("published");
        debug!(id = %reply.id, ok = reply.err.is_none(), "reply published");
        Ok(())
    }
}

async fn ack(delivery: &Delivery) {
    if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
        error!(error = %e, "failed to ack delivery");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_with_echo() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", |data| async move { Ok(data) });
        registry.register("fail", |_| async move { Err("handler exploded".into()) });
        registry
    }

    #[tokio::test]
    async fn dispatch_routes_by_pattern() {
        let registry = registry_with_echo();

        let envelope = Envelope::request("echo", json!({"n": 1}));
        let outcome = registry.dispatch(&envelope).await;
        assert_eq!(outcome.unwrap().unwrap(), json!({"n": 1}));
    }

    #[tokio::test]
    async fn dispatch_surfaces_handler_errors() {
        let registry = registry_with_echo();

        let envelope = Envelope::event("fail", json!(null));
        let outcome = registry.dispatch(&envelope).await.unwrap();
        assert_eq!(outcome.unwrap_err().to_string(), "handler exploded");
    }

    #[tokio::test]
    async fn dispatch_reports_unknown_patterns() {
        let registry = registry_with_echo();

        let envelope = Envelope::event("nope", json!(null));
        assert!(registry.dispatch(&envelope).await.is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = HandlerRegistry::new();
        registry.register("p", |_| async move { Ok(json!(1)) });
        registry.register("p", |_| async move { Ok(json!(2)) });
        assert_eq!(registry.len(), 1);
    }
}
