//! Tally entry point.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tally::config::{AppConfig, parse_duration};
use tally::queue::RedisQueue;
use tally::storage::PostgresSink;
use tally::worker::DrainWorker;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Queue drain worker that persists votes from a Redis list into PostgreSQL",
    version
)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Host of the Redis queue holding pending votes
    #[arg(long, env = "QUEUE_HOST")]
    queue_host: Option<String>,

    /// Port of the Redis queue
    #[arg(long, env = "TALLY_QUEUE_PORT")]
    queue_port: Option<u16>,

    /// Name of the list votes are popped from
    #[arg(long, env = "TALLY_QUEUE_LIST")]
    queue_list: Option<String>,

    /// Host of the PostgreSQL database votes are persisted into
    #[arg(long, env = "SINK_HOST")]
    sink_host: Option<String>,

    /// Port of the PostgreSQL database
    #[arg(long, env = "TALLY_SINK_PORT")]
    sink_port: Option<u16>,

    /// Database user
    #[arg(long, env = "TALLY_SINK_USER")]
    sink_user: Option<String>,

    /// Database password
    #[arg(long, env = "TALLY_SINK_PASSWORD")]
    sink_password: Option<String>,

    /// Database name
    #[arg(long, env = "TALLY_SINK_DATABASE")]
    sink_database: Option<String>,

    /// Delay between drain iterations (e.g. "1s", "500ms")
    #[arg(long, env = "TALLY_DRAIN_INTERVAL", value_parser = parse_duration)]
    interval: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tally=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // CLI and environment values take precedence over the file.
    if let Some(host) = cli.queue_host {
        config.queue.host = host;
    }
    if let Some(port) = cli.queue_port {
        config.queue.port = port;
    }
    if let Some(list) = cli.queue_list {
        config.queue.list = list;
    }
    if let Some(host) = cli.sink_host {
        config.sink.host = host;
    }
    if let Some(port) = cli.sink_port {
        config.sink.port = port;
    }
    if let Some(user) = cli.sink_user {
        config.sink.user = user;
    }
    if let Some(password) = cli.sink_password {
        config.sink.password = password;
    }
    if let Some(database) = cli.sink_database {
        config.sink.database = database;
    }
    if let Some(interval) = cli.interval {
        config.drain.interval = interval;
    }
    config.validate()?;

    info!(
        queue = %config.queue.url(),
        sink = %config.sink.addr(),
        interval = %humantime::format_duration(config.drain.interval),
        "Starting tally drain worker"
    );

    let queue = RedisQueue::connect(&config.queue).await?;
    let sink = PostgresSink::connect(&config.sink).await?;

    let cancel = CancellationToken::new();
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping drain worker");
        shutdown_cancel.cancel();
    });

    let mut worker = DrainWorker::new(queue, sink.clone(), config.drain, cancel);
    let result = worker.run().await;
    sink.close().await;
    result?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
