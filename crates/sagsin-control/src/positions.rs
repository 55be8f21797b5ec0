//! Read-time position drift for `GET /nodes/positions`.
//!
//! Unlike [`crate::epoch::tick`], which mutates stored node state once
//! per epoch, this view recomputes a presentation-layer position on
//! every request from elapsed wall-clock time — so two requests a
//! millisecond apart see a continuously moving satellite rather than a
//! value that only updates once per `epoch_sec`.

use serde::Serialize;

use sagsin_common::models::{GraphState, Node, NodeKind};

/// Longitude drift rate, degrees per second, before the speed multiplier.
fn deg_per_sec(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Sat => 0.06,
        NodeKind::Air => 0.01,
        NodeKind::Sea => 0.002,
        NodeKind::Ground => 0.0,
    }
}

/// Deterministic per-id jitter in `[-amplitude, amplitude]`, stable
/// across calls for a given `id` (a hash-like sine, not a stored RNG
/// state — this view must be pure in `(node, t)`).
fn id_jitter(id: i32, amplitude: f64) -> f64 {
    let x = (id as f64) * 12.9898;
    let frac = (x.sin() * 43_758.5453).fract().abs();
    (frac * 2.0 - 1.0) * amplitude
}

#[derive(Debug, Clone, Serialize)]
pub struct NodePosition {
    pub id: i32,
    pub lat: f64,
    pub lon: f64,
    pub alt_km: f64,
}

/// Compute drifted positions for every node at elapsed time `t_sec`
/// (since controller start) scaled by `multiplier`.
pub fn drifted_positions(graph: &GraphState, t_sec: f64, multiplier: f64) -> Vec<NodePosition> {
    graph
        .nodes
        .iter()
        .map(|n| drift_one(n, t_sec, multiplier))
        .collect()
}

fn drift_one(node: &Node, t_sec: f64, multiplier: f64) -> NodePosition {
    let lon = Node::normalize_lon(node.lon + deg_per_sec(node.kind) * t_sec * multiplier);
    let lat = if matches!(node.kind, NodeKind::Sat | NodeKind::Air | NodeKind::Sea) {
        (node.lat + id_jitter(node.id, 0.05)).clamp(-90.0, 90.0)
    } else {
        node.lat
    };
    NodePosition {
        id: node.id,
        lat,
        lon,
        alt_km: node.alt_m / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i32, kind: NodeKind, lon: f64) -> Node {
        Node { id, kind, lat: 0.0, lon, alt_m: 550_000.0, name: String::new() }
    }

    #[test]
    fn ground_nodes_are_stationary() {
        let gs = GraphState::new(vec![node(0, NodeKind::Ground, 10.0)], vec![]);
        let a = drifted_positions(&gs, 0.0, 1.0);
        let b = drifted_positions(&gs, 1000.0, 1.0);
        assert_eq!(a[0].lon, b[0].lon);
    }

    #[test]
    fn satellites_drift_eastward_with_time() {
        let gs = GraphState::new(vec![node(0, NodeKind::Sat, 0.0)], vec![]);
        let early = drifted_positions(&gs, 10.0, 1.0);
        let later = drifted_positions(&gs, 1000.0, 1.0);
        assert!(later[0].lon > early[0].lon);
    }

    #[test]
    fn speed_multiplier_scales_drift() {
        let gs = GraphState::new(vec![node(0, NodeKind::Sat, 0.0)], vec![]);
        let slow = drifted_positions(&gs, 100.0, 1.0);
        let fast = drifted_positions(&gs, 100.0, 5.0);
        assert!(fast[0].lon > slow[0].lon);
    }

    #[test]
    fn altitude_is_reported_in_km() {
        let gs = GraphState::new(vec![node(0, NodeKind::Sat, 0.0)], vec![]);
        assert_eq!(drifted_positions(&gs, 0.0, 1.0)[0].alt_km, 550.0);
    }
}
