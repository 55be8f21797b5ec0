//! POST /route
//!
//! Runs ACO (falling back to BFS) over the current graph snapshot, then
//! recomputes `latency_ms`/`throughput_mbps` fresh from node positions
//! and the link-budget model rather than trusting possibly-stale
//! `Link` attributes — the epoch updater moves nodes without rebuilding
//! link attributes (spec.md §4.6).

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use sagsin_aco::{compute_edge_costs, solve_route};
use sagsin_geo::{link_budget, node_distance_km};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/route", post(route))
}

#[derive(Debug, Deserialize)]
struct RouteObjective {
    weights: Option<[f64; 4]>,
}

#[derive(Debug, Deserialize)]
struct RouteRequest {
    src: i32,
    dst: i32,
    objective: Option<RouteObjective>,
}

#[derive(Debug, Serialize)]
struct RouteResponse {
    path: Vec<i32>,
    cost: f64,
    latency_ms: f64,
    throughput_mbps: f64,
}

async fn route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    // Snapshot the graph and drop the read guard before running the
    // solver — ACO must not hold the lock across its full run, or a long
    // solve starves the epoch timer's write lock for its duration.
    let graph = state.graph().read().await.clone();
    if graph.node(req.src).is_none() || graph.node(req.dst).is_none() {
        return Err(ApiError::bad_request("unknown src or dst node id"));
    }

    let mut aco_cfg = state.config().read().await.aco;
    if let Some(weights) = req.objective.and_then(|o| o.weights) {
        aco_cfg.weights = weights;
    }
    let costs = compute_edge_costs(&graph, &aco_cfg);

    let path = {
        let mut rng = state.rng().lock().await;
        solve_route(&graph, &costs, &aco_cfg, req.src, req.dst, &mut *rng)
    };
    let Some(path) = path else {
        return Err(ApiError::unprocessable("no feasible path"));
    };

    let mut cost = 0.0;
    for w in path.windows(2) {
        let idx = graph.edge_index[&(w[0], w[1])];
        cost += costs.get(idx);
    }

    let cfg = state.config().read().await;
    let mut latency_ms = 0.0;
    let mut throughput_mbps = f64::INFINITY;
    for w in path.windows(2) {
        let a = graph.node(w[0]).expect("path node exists");
        let b = graph.node(w[1]).expect("path node exists");
        let distance_km = node_distance_km(a, b);
        let budget = link_budget(distance_km, a.kind, b.kind, &cfg.link_model);
        latency_ms += budget.latency_ms;
        throughput_mbps = throughput_mbps.min(budget.capacity_mbps);
    }
    if !throughput_mbps.is_finite() {
        throughput_mbps = 0.0; // src == dst: zero hops, nothing to bottleneck
    }

    Ok(Json(RouteResponse { path, cost, latency_ms, throughput_mbps }))
}
