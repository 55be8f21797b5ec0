//! POST /config/reload
//!
//! Re-reads the TOML config file, reloads the node list, and rebuilds
//! the graph from scratch. The previous graph's `enabled` overrides are
//! discarded — a rebuild always starts every admissible edge enabled
//! (see DESIGN.md, "disabled edges on reload").

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use sagsin_common::config::Config;
use serde::Serialize;

use super::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/config/reload", post(reload))
}

#[derive(Debug, Serialize)]
struct Ok_ {
    ok: bool,
}

async fn reload(State(state): State<AppState>) -> Result<Json<Ok_>, ApiError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".into());
    let new_config =
        Config::load(&path).map_err(|e| ApiError::internal(format!("config reload failed: {e}")))?;
    let nodes = sagsin_common::nodes::load_nodes(&new_config, None);
    let new_graph = crate::graph::build_graph(nodes, &new_config);

    let mut config = state.config().write().await;
    let mut graph = state.graph().write().await;
    *config = new_config;
    *graph = new_graph;

    Ok(Json(Ok_ { ok: true }))
}
