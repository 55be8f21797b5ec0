//! GET /nodes, GET /links, GET /nodes/positions
//!
//! Immutable views over the current graph snapshot. Names default to
//! `"{kind}-{id}"` (spec.md §4.6), positions are recomputed per request
//! from elapsed wall-clock time (see [`crate::positions`]).

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::positions::{drifted_positions, NodePosition};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nodes", get(list_nodes))
        .route("/links", get(list_links))
        .route("/nodes/positions", get(list_positions))
}

#[derive(Serialize)]
struct NodeView {
    id: i32,
    kind: sagsin_common::models::NodeKind,
    lat: f64,
    lon: f64,
    alt_m: f64,
    name: String,
}

async fn list_nodes(State(state): State<AppState>) -> Json<Vec<NodeView>> {
    let graph = state.graph().read().await;
    let views = graph
        .nodes
        .iter()
        .map(|n| NodeView {
            id: n.id,
            kind: n.kind,
            lat: n.lat,
            lon: n.lon,
            alt_m: n.alt_m,
            name: n.display_name(),
        })
        .collect();
    Json(views)
}

#[derive(Serialize)]
struct LinkView {
    u: i32,
    v: i32,
    latency_ms: f64,
    capacity_mbps: f64,
    energy_j: f64,
    reliability: f64,
    enabled: bool,
}

async fn list_links(State(state): State<AppState>) -> Json<Vec<LinkView>> {
    let graph = state.graph().read().await;
    let views = graph
        .links
        .iter()
        .map(|l| LinkView {
            u: l.u,
            v: l.v,
            latency_ms: l.latency_ms,
            capacity_mbps: l.capacity_mbps,
            energy_j: l.energy_j,
            reliability: l.reliability,
            enabled: l.enabled,
        })
        .collect();
    Json(views)
}

async fn list_positions(State(state): State<AppState>) -> Json<Vec<NodePosition>> {
    let graph = state.graph().read().await;
    let t = state.elapsed_sec();
    let multiplier = state.speed_multiplier().await;
    Json(drifted_positions(&graph, t, multiplier))
}
