//! SAGSIN Node Agent
//!
//! Lightweight daemon representing a single node's agent process.
//!
//! - Serves the TCP relay protocol so `/simulate/send-packet` can hop
//!   frames node-to-node (spec.md §6.2)
//! - Observes the controller's `/events` SSE stream and logs progress
//!   frames addressed to this node
//! - Emits a heartbeat log line on a fixed interval

mod observer;
mod relay;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// SAGSIN node agent daemon.
#[derive(Parser, Debug)]
#[command(name = "sagsin-agent", about = "SAGSIN node agent")]
struct Cli {
    /// This agent's node id, as assigned by the controller's node loader.
    #[arg(long, env = "NODE_INDEX")]
    node_index: i32,

    /// Controller base URL (no trailing path).
    #[arg(long, env = "CONTROLLER_URL", default_value = "http://localhost:3000")]
    controller_url: String,

    /// TCP port this agent's relay listens on.
    #[arg(long, env = "NODE_TCP_PORT", default_value_t = sagsin_common::protocol::DEFAULT_NODE_TCP_PORT)]
    tcp_port: u16,

    /// Heartbeat log interval in seconds.
    #[arg(long, env = "HEARTBEAT_SEC", default_value_t = 10)]
    heartbeat_sec: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(
        node_index = cli.node_index,
        controller_url = %cli.controller_url,
        tcp_port = cli.tcp_port,
        "sagsin-agent starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let relay_handle = tokio::spawn(relay::serve(cli.node_index, cli.tcp_port, shutdown_rx.clone()));

    let observer_shutdown = shutdown_rx.clone();
    let controller_url = cli.controller_url.clone();
    let node_index = cli.node_index;
    let observer_handle = tokio::spawn(async move {
        observer::run(&controller_url, node_index, observer_shutdown).await;
    });

    let mut heartbeat_shutdown = shutdown_rx.clone();
    let heartbeat_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(cli.heartbeat_sec.max(1)));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::info!(node_index = cli.node_index, "heartbeat");
                }
                _ = heartbeat_shutdown.changed() => {
                    if *heartbeat_shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down");
            let _ = shutdown_tx.send(true);
        }
        result = relay_handle => {
            if let Err(e) = result {
                tracing::error!("relay task failed: {e}");
            }
        }
    }

    let _ = observer_handle.await;
    let _ = heartbeat_handle.await;

    tracing::info!("sagsin-agent stopped");
    Ok(())
}
