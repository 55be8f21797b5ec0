//! `/simulate/*` and `/tcp/test` — link toggling, epoch forcing, speed
//! control, and packet-send orchestration.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sagsin_aco::{compute_edge_costs, solve_route};
use sagsin_common::ids::session_id;
use sagsin_common::models::GraphState;
use sagsin_common::protocol::{
    node_hostname, PacketProgressEvent, PacketStatus, RelayFrame, DEFAULT_NODE_TCP_PORT,
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use super::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/simulate/toggle-link", post(toggle_link))
        .route("/simulate/set-epoch", post(set_epoch))
        .route("/simulate/set-speed", post(set_speed))
        .route("/simulate/get-speed", get(get_speed))
        .route("/simulate/send-packet", post(send_packet))
        .route("/tcp/test", get(tcp_test))
}

#[derive(Debug, Serialize)]
struct Ok_ {
    ok: bool,
}

// ── toggle-link ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ToggleLinkRequest {
    u: i32,
    v: i32,
    enabled: bool,
}

async fn toggle_link(
    State(state): State<AppState>,
    Json(req): Json<ToggleLinkRequest>,
) -> Result<Json<Ok_>, ApiError> {
    let mut graph = state.graph().write().await;
    let idx = *graph
        .edge_index
        .get(&(req.u, req.v))
        .ok_or_else(|| ApiError::not_found(format!("no link between {} and {}", req.u, req.v)))?;
    graph.links[idx].enabled = req.enabled;
    Ok(Json(Ok_ { ok: true }))
}

// ── set-epoch ────────────────────────────────────────────────────────

async fn set_epoch(State(state): State<AppState>) -> Json<Ok_> {
    let epoch_sec = state.config().read().await.epoch_sec;
    let multiplier = state.speed_multiplier().await;
    let mut graph = state.graph().write().await;
    let mut rng = state.rng().lock().await;
    crate::epoch::tick(&mut graph, epoch_sec, multiplier, &mut *rng);
    Json(Ok_ { ok: true })
}

// ── set-speed / get-speed ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SetSpeedRequest {
    multiplier: f64,
}

#[derive(Debug, Serialize)]
struct SpeedResponse {
    ok: bool,
    multiplier: f64,
}

async fn set_speed(
    State(state): State<AppState>,
    Json(req): Json<SetSpeedRequest>,
) -> Result<Json<SpeedResponse>, ApiError> {
    if req.multiplier <= 0.0 {
        return Err(ApiError::bad_request("multiplier must be positive"));
    }
    state.set_speed_multiplier(req.multiplier).await;
    Ok(Json(SpeedResponse { ok: true, multiplier: req.multiplier }))
}

#[derive(Debug, Serialize)]
struct GetSpeedResponse {
    multiplier: f64,
}

async fn get_speed(State(state): State<AppState>) -> Json<GetSpeedResponse> {
    Json(GetSpeedResponse { multiplier: state.speed_multiplier().await })
}

// ── send-packet ──────────────────────────────────────────────────────

/// Simulated per-hop delay between `pending` and `success` frames. A UX
/// device only — not a correctness element (spec.md §9).
const HOP_SIMULATION_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Deserialize)]
struct SendPacketRequest {
    src: i32,
    dst: i32,
    #[allow(dead_code)]
    protocol: String,
    message: Option<String>,
    path: Option<Vec<i32>>,
}

#[derive(Debug, Serialize)]
struct SendPacketResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
    path: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    #[serde(rename = "latency_ms", skip_serializing_if = "Option::is_none")]
    latency_ms: Option<f64>,
    #[serde(rename = "throughput_mbps", skip_serializing_if = "Option::is_none")]
    throughput_mbps: Option<f64>,
}

async fn send_packet(
    State(state): State<AppState>,
    Json(req): Json<SendPacketRequest>,
) -> Result<Json<SendPacketResponse>, ApiError> {
    // Snapshot and drop the read guard before the solver runs — ACO must
    // not hold the lock across its full run (see route.rs).
    let graph = state.graph().read().await.clone();

    let (path, cost) = if let Some(path) = req.path {
        (path, None)
    } else {
        let aco_cfg = state.config().read().await.aco;
        let costs = compute_edge_costs(&graph, &aco_cfg);
        let path = {
            let mut rng = state.rng().lock().await;
            solve_route(&graph, &costs, &aco_cfg, req.src, req.dst, &mut *rng)
        }
        .ok_or_else(|| ApiError::unprocessable("no feasible path"))?;
        let cost = path
            .windows(2)
            .map(|w| costs.get(graph.edge_index[&(w[0], w[1])]))
            .sum();
        (path, Some(cost))
    };

    let cumulative_latencies = cumulative_hop_latencies(&graph, &path);
    let total_latency_ms = cumulative_latencies.last().copied();
    let throughput_mbps = path
        .windows(2)
        .map(|w| graph.links[graph.edge_index[&(w[0], w[1])]].capacity_mbps)
        .fold(f64::INFINITY, f64::min);
    let throughput_mbps = if throughput_mbps.is_finite() { Some(throughput_mbps) } else { None };
    drop(graph);

    let session = session_id();

    spawn_hop_simulation(
        state.clone(),
        session.clone(),
        path.clone(),
        cumulative_latencies,
        req.message.clone(),
    );
    spawn_tcp_relay(session.clone(), path.clone(), req.message);

    Ok(Json(SendPacketResponse {
        session_id: session,
        path,
        cost,
        latency_ms: total_latency_ms,
        throughput_mbps,
    }))
}

/// Cumulative latency (ms) at each node in `path`, `path[0]` is always 0.
fn cumulative_hop_latencies(graph: &GraphState, path: &[i32]) -> Vec<f64> {
    let mut acc = Vec::with_capacity(path.len());
    let mut running = 0.0;
    acc.push(0.0);
    for w in path.windows(2) {
        let link = &graph.links[graph.edge_index[&(w[0], w[1])]];
        running += link.latency_ms;
        acc.push(running);
    }
    acc
}

/// Broadcast `pending`/`success` SSE frames for each node in `path`,
/// spaced by [`HOP_SIMULATION_DELAY`]. The user message is attached only
/// to `pending` at `src` and `success` at `dst` (spec.md §8 scenario 4).
fn spawn_hop_simulation(
    state: AppState,
    session: String,
    path: Vec<i32>,
    cumulative_latencies: Vec<f64>,
    message: Option<String>,
) {
    tokio::spawn(async move {
        for (i, &node_id) in path.iter().enumerate() {
            let cumulative_ms = cumulative_latencies[i];
            let pending_msg = if i == 0 { message.clone() } else { None };
            state.events().broadcast(PacketProgressEvent::new(
                PacketStatus::Pending,
                session.clone(),
                node_id,
                cumulative_ms,
                pending_msg,
            ));

            tokio::time::sleep(HOP_SIMULATION_DELAY).await;

            let success_msg = if i + 1 == path.len() { message.clone() } else { None };
            state.events().broadcast(PacketProgressEvent::new(
                PacketStatus::Success,
                session.clone(),
                node_id,
                cumulative_ms,
                success_msg,
            ));
        }
    });
}

/// Open a TCP connection to the first hop's node agent and send the
/// relay frame; subsequent hops are forwarded agent-to-agent. Connect
/// failures are logged, never surfaced to the HTTP caller (spec.md §7
/// "Transient network").
fn spawn_tcp_relay(session_id: String, path: Vec<i32>, message: Option<String>) {
    if path.is_empty() {
        return;
    }
    tokio::spawn(async move {
        let frame = RelayFrame { session_id, path, idx: 0, message };
        if let Err(e) = send_relay_frame(frame.path[0], &frame).await {
            tracing::warn!(node_id = frame.path[0], error = %e, "first-hop relay failed");
        }
    });
}

async fn send_relay_frame(node_id: i32, frame: &RelayFrame) -> anyhow::Result<()> {
    let host = node_hostname(node_id);
    let addr = format!("{host}:{DEFAULT_NODE_TCP_PORT}");
    let mut stream = tokio::time::timeout(Duration::from_secs(5), TcpStream::connect(&addr)).await??;
    let payload = serde_json::to_vec(frame)?;
    stream.write_all(&payload).await?;
    stream.shutdown().await?;
    Ok(())
}

// ── tcp/test ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TcpTestQuery {
    node_id: i32,
    port: Option<u16>,
}

#[derive(Debug, Serialize)]
struct TcpTestResponse {
    ok: bool,
    host: String,
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn tcp_test(Query(q): Query<TcpTestQuery>) -> Json<TcpTestResponse> {
    let host = node_hostname(q.node_id);
    let port = q.port.unwrap_or(DEFAULT_NODE_TCP_PORT);
    let addr = format!("{host}:{port}");
    match tokio::time::timeout(Duration::from_secs(2), TcpStream::connect(&addr)).await {
        Ok(Ok(_)) => Json(TcpTestResponse { ok: true, host, port, error: None }),
        Ok(Err(e)) => Json(TcpTestResponse { ok: false, host, port, error: Some(e.to_string()) }),
        Err(_) => Json(TcpTestResponse { ok: false, host, port, error: Some("timed out".into()) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagsin_common::models::{Link, Node, NodeKind};

    fn node(id: i32) -> Node {
        Node { id, kind: NodeKind::Ground, lat: 0.0, lon: 0.0, alt_m: 0.0, name: String::new() }
    }

    #[test]
    fn cumulative_latencies_start_at_zero_and_accumulate() {
        let gs = GraphState::new(
            vec![node(0), node(1), node(2)],
            vec![
                Link { u: 0, v: 1, latency_ms: 3.0, capacity_mbps: 1.0, energy_j: 0.0, reliability: 1.0, enabled: true },
                Link { u: 1, v: 2, latency_ms: 4.0, capacity_mbps: 1.0, energy_j: 0.0, reliability: 1.0, enabled: true },
            ],
        );
        let acc = cumulative_hop_latencies(&gs, &[0, 1, 2]);
        assert_eq!(acc, vec![0.0, 3.0, 7.0]);
    }
}
