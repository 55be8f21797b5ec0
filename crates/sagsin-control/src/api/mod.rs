//! REST + SSE API route tree.

pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod nodes;
pub mod route;
pub mod simulate;

use axum::Router;

use crate::state::AppState;

/// Build the full HTTP router. Flat, not nested under `/api` — every
/// path matches spec.md §6.1 literally (`/health`, `/route`, etc.).
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(nodes::router())
        .merge(route::router())
        .merge(simulate::router())
        .merge(config::router())
        .merge(events::router())
}
