//! Data models for the SAGSIN platform.
//!
//! These types represent the connectivity graph — nodes, links, and the
//! derived adjacency/edge-index views — shared between the controller
//! (which owns and mutates them) and the solvers (which borrow a snapshot).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Node ────────────────────────────────────────────────────────────

/// A single moving platform in the network: satellite, aircraft, maritime
/// platform, or ground station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Sat,
    Air,
    Ground,
    Sea,
}

impl NodeKind {
    /// Unordered pair key used to look up max-range and kappa tables.
    /// Always sorted so `(sat, ground)` and `(ground, sat)` map to the
    /// same string.
    pub fn pair_key(a: NodeKind, b: NodeKind) -> String {
        let mut names = [a.as_str(), b.as_str()];
        names.sort_unstable();
        format!("{}:{}", names[0], names[1])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Sat => "sat",
            NodeKind::Air => "air",
            NodeKind::Ground => "ground",
            NodeKind::Sea => "sea",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the connectivity graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: i32,
    pub kind: NodeKind,
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    pub name: String,
}

impl Node {
    /// Normalize `lon` into `(-180, 180]`, as required by the data model.
    pub fn normalize_lon(lon: f64) -> f64 {
        let wrapped = ((lon + 180.0).rem_euclid(360.0)) - 180.0;
        if wrapped <= -180.0 {
            180.0
        } else {
            wrapped
        }
    }

    /// The display name, defaulting to `"{kind}-{id}"` when none was set.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("{}-{}", self.kind, self.id)
        } else {
            self.name.clone()
        }
    }
}

// ── Link ────────────────────────────────────────────────────────────

/// A canonical edge `(u, v)` with `u < v`, carrying deterministic
/// link-budget attributes plus the mutable `enabled` flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Link {
    pub u: i32,
    pub v: i32,
    pub latency_ms: f64,
    pub capacity_mbps: f64,
    pub energy_j: f64,
    pub reliability: f64,
    pub enabled: bool,
}

// ── GraphState ──────────────────────────────────────────────────────

/// The connectivity graph: nodes, links, and derived adjacency/edge-index
/// views. `adj` and `edge_index` are always consistent with `links` — they
/// are rebuilt together and never mutated independently.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// node id -> neighbor node ids (both directions of every link, enabled or not)
    pub adj: HashMap<i32, Vec<i32>>,
    /// both `(u, v)` and `(v, u)` map to the same index into `links`
    pub edge_index: HashMap<(i32, i32), usize>,
}

impl GraphState {
    /// Build `adj` and `edge_index` from `links`. Called once after the
    /// link vector is finalized; never mutated incrementally.
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let mut adj: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut edge_index: HashMap<(i32, i32), usize> = HashMap::new();
        for (idx, link) in links.iter().enumerate() {
            adj.entry(link.u).or_default().push(link.v);
            adj.entry(link.v).or_default().push(link.u);
            edge_index.insert((link.u, link.v), idx);
            edge_index.insert((link.v, link.u), idx);
        }
        Self {
            nodes,
            links,
            adj,
            edge_index,
        }
    }

    pub fn node(&self, id: i32) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link_between(&self, u: i32, v: i32) -> Option<&Link> {
        self.edge_index.get(&(u, v)).map(|&idx| &self.links[idx])
    }

    /// Enabled neighbors of `u`, in the deterministic order `adj` was built.
    pub fn enabled_neighbors(&self, u: i32) -> Vec<i32> {
        self.adj
            .get(&u)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&v| {
                self.edge_index
                    .get(&(u, v))
                    .map(|&idx| self.links[idx].enabled)
                    .unwrap_or(false)
            })
            .collect()
    }
}
