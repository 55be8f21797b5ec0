//! Node loader.
//!
//! Produces a stable, id-assigned list of typed nodes. Consuming an
//! external seed store (TLE catalog, ground-station registry, buoy
//! registry, flight-state registry) is an external collaborator (spec.md
//! §1 Out of scope) — this loader only defines the interface and a
//! deterministic toy fallback so the system runs with zero external
//! configuration, grounded on the reference implementation's
//! `on_start` fallback.

use crate::config::Config;
use crate::models::{Node, NodeKind};

/// A source of raw `{kind, lat, lon, alt}` tuples, as produced by an
/// external feed. Implementations outside this crate adapt a TLE
/// catalog, ground-station registry, etc. into this trait.
pub trait NodeSource {
    fn fetch(&self) -> anyhow::Result<Vec<RawNode>>;
}

/// A node before id assignment.
#[derive(Debug, Clone)]
pub struct RawNode {
    pub kind: NodeKind,
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    pub name: Option<String>,
}

/// Assign dense `id`s to raw nodes, filtering out kinds disabled in `cfg`,
/// and normalize longitude.
pub fn assign_ids(cfg: &Config, raw: Vec<RawNode>) -> Vec<Node> {
    raw.into_iter()
        .filter(|n| cfg.is_enabled(n.kind))
        .enumerate()
        .map(|(id, n)| {
            let id = id as i32;
            Node {
                id,
                kind: n.kind,
                lat: n.lat,
                lon: Node::normalize_lon(n.lon),
                alt_m: n.alt_m,
                name: n.name.unwrap_or_default(),
            }
        })
        .collect()
}

/// Load nodes from `source` if present, else fall back to the toy graph.
/// Always returns a non-empty, id-assigned list.
pub fn load_nodes(cfg: &Config, source: Option<&dyn NodeSource>) -> Vec<Node> {
    if !cfg.offline {
        if let Some(source) = source {
            match source.fetch() {
                Ok(raw) if !raw.is_empty() => return assign_ids(cfg, raw),
                Ok(_) => tracing::info!("node source returned no nodes, using toy fallback"),
                Err(e) => tracing::warn!(error = %e, "node source fetch failed, using toy fallback"),
            }
        }
    }
    assign_ids(cfg, toy_nodes())
}

/// The literal 3-node seed graph used throughout spec.md §8's end-to-end
/// scenarios: two co-located ground stations and one low-earth-orbit
/// satellite.
pub fn toy_nodes() -> Vec<RawNode> {
    vec![
        RawNode {
            kind: NodeKind::Ground,
            lat: 0.0,
            lon: 0.0,
            alt_m: 0.0,
            name: None,
        },
        RawNode {
            kind: NodeKind::Ground,
            lat: 0.0,
            lon: 0.1,
            alt_m: 0.0,
            name: None,
        },
        RawNode {
            kind: NodeKind::Sat,
            lat: 0.0,
            lon: 0.2,
            alt_m: 550_000.0,
            name: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toy_nodes_assign_dense_ids() {
        let cfg = Config::default();
        let nodes = assign_ids(&cfg, toy_nodes());
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].id, 0);
        assert_eq!(nodes[1].id, 1);
        assert_eq!(nodes[2].id, 2);
        assert_eq!(nodes[2].kind, NodeKind::Sat);
    }

    #[test]
    fn load_nodes_falls_back_without_a_source() {
        let cfg = Config::default();
        let nodes = load_nodes(&cfg, None);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn disabled_kinds_are_filtered() {
        let mut cfg = Config::default();
        cfg.enable_sat = false;
        let nodes = assign_ids(&cfg, toy_nodes());
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.kind != NodeKind::Sat));
    }
}
