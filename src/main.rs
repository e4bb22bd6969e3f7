//! Gateway composition root.
//!
//! Startup is strictly linear: configuration → logging → container → queue
//! transport → routes and docs → consumer → HTTP listener. Any failure
//! along the way aborts with a non-zero exit; nothing listens until every
//! earlier step has completed.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::{
    config, observability, AppState, HandlerRegistry, HttpServer, QueueClient, QueueConsumer,
    QueueTransport, Shutdown, StartupError,
};

#[derive(Debug, Parser)]
#[command(name = "api-gateway", version, about = "HTTP + message-queue API gateway")]
struct Args {
    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override the configured HTTP bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        // Logging may not be initialized when config loading fails.
        eprintln!("api-gateway: startup failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    // 1. Configuration, fail-fast on missing required variables
    match &args.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .map_err(|e| StartupError::io("read env file", std::io::Error::other(e)))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    let mut config = config::load_from_env()?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    let config = Arc::new(config);

    // 2. Cross-cutting context: logging and metrics before anything observes them
    observability::logging::init(&config);
    if config.observability.metrics_enabled {
        observability::metrics::init_metrics(config.observability.metrics_address);
    }
    tracing::info!(app = %config.app_name, "starting gateway");

    // 3–4. Container construction and queue transport attachment.
    // Declaring topology registers the subscription; consumption starts later.
    let transport = QueueTransport::connect(&config.queue).await?;
    transport.declare_topology().await?;
    let client = Arc::new(QueueClient::new(&transport).await?);

    // External controllers register their message patterns here.
    let registry = HandlerRegistry::new();
    let consumer = QueueConsumer::new(&transport, registry);

    // 5–7. Middleware, health route and docs artifact are wired into the
    // router when the server is built.
    let state = AppState::new(config.clone(), Some(client));
    let server = HttpServer::new(state);

    let shutdown = Arc::new(Shutdown::new());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            api_gateway::lifecycle::signals::wait_for_signal().await;
            shutdown.trigger();
        });
    }

    // 8. Consumer first so backlog drains against a fully built container,
    // HTTP listener last.
    let consumer_task = consumer.start(shutdown.subscribe()).await?;

    let listener = TcpListener::bind(config.bind_address)
        .await
        .map_err(|e| StartupError::io("bind HTTP listener", e))?;
    tracing::info!(
        address = %config.bind_address,
        queue = %config.queue.queue_name,
        "gateway listening"
    );

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(|e| StartupError::io("serve HTTP", e))?;

    // Ordered teardown: HTTP has drained; stop the consumer, close the broker.
    if let Err(e) = consumer_task.await {
        tracing::warn!(error = %e, "queue consumer task panicked");
    }
    if let Err(e) = transport.close().await {
        tracing::warn!(error = %e, "broker connection close failed");
    }

    tracing::info!("gateway stopped");
    Ok(())
}
