//! Shared types for the SAGSIN platform.
//!
//! This crate contains:
//! - **Data models** — Node, Link, GraphState and the per-request solver view
//! - **Wire protocol** — TCP relay frames and SSE progress event payloads
//! - **Configuration** — the tunable knobs read from `config.toml`
//! - **Node loader** — toy-graph fallback when no external source is wired in
//! - **ID generation** — session UUIDs

pub mod config;
pub mod ids;
pub mod models;
pub mod nodes;
pub mod protocol;
