//! Publish side of the queue transport.
//!
//! # Responsibilities
//! - Fire-and-forget publishes (`emit`) to the gateway queue
//! - Request/response publishes (`send`): correlation-id matched replies on
//!   an exclusive, server-named reply queue, bounded by the RPC timeout
//!
//! # Design Decisions
//! - One reply queue per process, multiplexed by correlation id, instead of
//!   one throwaway queue per request
//! - Reply consumption runs with `no_ack`: losing a reply only fails the
//!   one waiting request, which times out anyway

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::{FieldTable, ShortString};
use lapin::{BasicProperties, Channel, Consumer};
use serde_json::Value;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::observability::metrics;
use crate::queue::envelope::{Envelope, ReplyEnvelope};
use crate::queue::transport::QueueTransport;
use crate::queue::QueueError;

type PendingReplies = Arc<Mutex<HashMap<String, oneshot::Sender<ReplyEnvelope>>>>;

/// Client for publishing messages to the gateway queue.
pub struct QueueClient {
    channel: Channel,
    config: QueueConfig,
    reply_queue: String,
    pending: PendingReplies,
}

impl QueueClient {
    /// Set up the reply queue and start the background reply pump.
    pub async fn new(transport: &QueueTransport) -> Result<Self, QueueError> {
        let channel = transport.channel().clone();
        let config = transport.config().clone();

        let reply_queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(QueueError::Channel)?;
        let reply_queue = reply_queue.name().as_str().to_string();

        let replies = channel
            .basic_consume(
                &reply_queue,
                "gateway-replies",
                BasicConsumeOptions {
                    no_ack: true,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(QueueError::Consume)?;

        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));
        tokio::spawn(pump_replies(replies, pending.clone()));

        Ok(Self {
            channel,
            config,
            reply_queue,
            pending,
        })
    }

    /// Publish a fire-and-forget event.
    pub async fn emit(&self, pattern: &str, data: Value) -> Result<(), QueueError> {
        let envelope = Envelope::event(pattern, data);
        self.publish(&envelope, BasicProperties::default().with_content_type(json_type()))
            .await
    }

    /// Publish a request and wait for its correlated reply.
    pub async fn send(&self, pattern: &str, data: Value) -> Result<Value, QueueError> {
        let id = Uuid::new_v4().to_string();
        let envelope = Envelope {
            pattern: pattern.to_string(),
            data,
            id: Some(id.clone()),
        };

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let properties = BasicProperties::default()
            .with_content_type(json_type())
            .with_correlation_id(ShortString::from(id.clone()))
            .with_reply_to(ShortString::from(self.reply_queue.clone()));

        if let Err(e) = self.publish(&envelope, properties).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        let timeout = Duration::from_secs(self.config.rpc_timeout_secs);
        let reply = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(QueueError::ReplyDropped),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(QueueError::RpcTimeout {
                    pattern: pattern.to_string(),
                    after_secs: self.config.rpc_timeout_secs,
                });
            }
        };

        match reply.err {
            Some(reason) => Err(QueueError::Remote(reason)),
            None => Ok(reply.response.unwrap_or(Value::Null)),
        }
    }

    async fn publish(
        &self,
        envelope: &Envelope,
        properties: BasicProperties,
    ) -> Result<(), QueueError> {
        let payload = serde_json::to_vec(envelope)?;
        self.channel
            .basic_publish(
                "",
                &self.config.queue_name,
                BasicPublishOptions::default(),
                &payload,
                properties,
            )
            .await
            .map_err(QueueError::Publish)?
            .await
            .map_err(QueueError::Publish)?;

        metrics::record_queue_message("published");
        debug!(pattern = %envelope.pattern, rpc = envelope.id.is_some(), "message published");
        Ok(())
    }
}

fn json_type() -> ShortString {
    ShortString::from("application/json")
}

/// Deliver incoming replies to their waiting `send` calls.
async fn pump_replies(mut replies: Consumer, pending: PendingReplies) {
    while let Some(delivery) = replies.next().await {
        let delivery = match delivery {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "reply consumer error");
                continue;
            }
        };

        let reply: ReplyEnvelope = match serde_json::from_slice(&delivery.data) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "discarding malformed reply");
                continue;
            }
        };

        match pending.lock().await.remove(&reply.id) {
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => debug!(id = %reply.id, "reply arrived after its request gave up"),
        }
    }
    debug!("reply consumer stream ended");
}
