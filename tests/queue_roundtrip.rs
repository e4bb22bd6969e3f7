//! Queue transport round-trip tests.
//!
//! These need a reachable broker (AMQP_TEST_URL, default local RabbitMQ),
//! so they are ignored by default: `cargo test -- --ignored` with a broker
//! up runs them.

use std::sync::Arc;

use serde_json::json;

use api_gateway::config::QueueConfig;
use api_gateway::{HandlerRegistry, QueueClient, QueueConsumer, QueueTransport, Shutdown};

fn test_config() -> QueueConfig {
    QueueConfig {
        url: std::env::var("AMQP_TEST_URL")
            .unwrap_or_else(|_| "amqp://127.0.0.1:5672".to_string()),
        queue_name: "gateway-queue-test".to_string(),
        durable: false,
        rpc_timeout_secs: 5,
    }
}

#[tokio::test]
#[ignore = "requires a running broker"]
async fn send_round_trips_through_a_registered_handler() {
    let config = test_config();
    let transport = QueueTransport::connect(&config).await.unwrap();
    transport.declare_topology().await.unwrap();

    let mut registry = HandlerRegistry::new();
    registry.register("math.double", |data| async move {
        let n = data["n"].as_i64().unwrap_or(0);
        Ok(json!({"n": n * 2}))
    });

    let shutdown = Shutdown::new();
    let consumer = QueueConsumer::new(&transport, registry);
    let consumer_task = consumer.start(shutdown.subscribe()).await.unwrap();

    let client = Arc::new(QueueClient::new(&transport).await.unwrap());
    let reply = client.send("math.double", json!({"n": 21})).await.unwrap();
    assert_eq!(reply, json!({"n": 42}));

    shutdown.trigger();
    consumer_task.await.unwrap();
    transport.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running broker"]
async fn unknown_patterns_fail_the_rpc_with_a_remote_error() {
    let config = test_config();
    let transport = QueueTransport::connect(&config).await.unwrap();
    transport.declare_topology().await.unwrap();

    let shutdown = Shutdown::new();
    let consumer = QueueConsumer::new(&transport, HandlerRegistry::new());
    let consumer_task = consumer.start(shutdown.subscribe()).await.unwrap();

    let client = QueueClient::new(&transport).await.unwrap();
    let err = client.send("no.such.pattern", json!({})).await.unwrap_err();
    assert!(err.to_string().contains("unknown pattern"));

    shutdown.trigger();
    consumer_task.await.unwrap();
    transport.close().await.unwrap();
}

#[tokio::test]
async fn connect_fails_fast_when_the_broker_is_down() {
    let config = QueueConfig {
        // Nothing listens here.
        url: "amqp://127.0.0.1:1".to_string(),
        ..test_config()
    };
    assert!(QueueTransport::connect(&config).await.is_err());
}
