//! Broker connection and queue topology.

use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};
use tracing::info;

use crate::config::QueueConfig;
use crate::queue::QueueError;

/// Owns the broker connection and the channel shared by publisher and
/// consumer. Connecting and declaring are separate steps: declaration
/// registers the subscription topology, it does not start consuming.
pub struct QueueTransport {
    connection: Connection,
    channel: Channel,
    config: QueueConfig,
}

impl QueueTransport {
    /// Connect to the broker. Fatal at startup when the broker is
    /// unreachable; reconnection policy belongs to the broker client, not
    /// the bootstrap.
    pub async fn connect(config: &QueueConfig) -> Result<Self, QueueError> {
        info!(queue = %config.queue_name, "connecting to message broker");

        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(QueueError::Connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(QueueError::Channel)?;

        Ok(Self {
            connection,
            channel,
            config: config.clone(),
        })
    }

    /// Declare the gateway queue.
    pub async fn declare_topology(&self) -> Result<(), QueueError> {
        self.channel
            .queue_declare(
                &self.config.queue_name,
                QueueDeclareOptions {
                    durable: self.config.durable,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(QueueError::Channel)?;

        info!(
            queue = %self.config.queue_name,
            durable = self.config.durable,
            "queue topology declared"
        );
        Ok(())
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Close the broker connection. Part of the ordered shutdown path.
    pub async fn close(&self) -> Result<(), QueueError> {
        self.connection
            .close(200, "gateway shutting down")
            .await
            .map_err(QueueError::Channel)
    }
}
