//! SAGSIN Control Plane
//!
//! Single binary serving the REST + SSE controller API described in
//! spec.md §6: routing over the live connectivity graph, simulated
//! mobility/impairment via a periodic epoch tick, and packet-send
//! orchestration over SSE and a TCP relay to node agents.

mod api;
mod epoch;
mod events;
mod graph;
mod positions;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use sagsin_common::config::Config;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ──────────────────────────────────────────────────
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".into());
    let config = Config::load(&config_path)?;

    // ── Graph ───────────────────────────────────────────────────
    let nodes = sagsin_common::nodes::load_nodes(&config, None);
    let graph_state = graph::build_graph(nodes, &config);

    // ── Shared state ────────────────────────────────────────────
    let epoch_sec = config.epoch_sec;
    let state = AppState::new(config, graph_state, None);

    // ── Epoch timer ─────────────────────────────────────────────
    let epoch_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(epoch_sec.max(1)));
        loop {
            interval.tick().await;
            let epoch_sec = epoch_state.config().read().await.epoch_sec;
            let multiplier = epoch_state.speed_multiplier().await;
            let mut graph = epoch_state.graph().write().await;
            let mut rng = epoch_state.rng().lock().await;
            epoch::tick(&mut graph, epoch_sec, multiplier, &mut *rng);
        }
    });

    // ── Router ──────────────────────────────────────────────────
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // ── Listen ──────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    tracing::info!("sagsin-control listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl_c handler");
    tracing::info!("shutdown signal received, draining in-flight sessions");
}
