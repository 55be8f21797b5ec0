//! Epoch updater: periodic mobility and impairment tick.
//!
//! Runs under the single writer lock on a `tokio::time::interval` of
//! period `epoch_sec`. Advances satellite longitude by a fixed angular
//! rate, jitters air/sea lat/lon, and flips each link's `enabled` flag
//! with probability [`LINK_FLIP_PROBABILITY`] to simulate transient
//! impairment. Never touches `adj`/`edgeIndex` — `enabled` is a link
//! attribute, not a structural change, so a full rebuild is never
//! implied by a tick.
//!
//! Takes an injectable RNG, following the reference scenario generator's
//! `StdRng::seed_from_u64` pattern for deterministic tests; production
//! callers seed from `rand::rng()`.

use rand::Rng;
use sagsin_common::models::{GraphState, NodeKind};

/// Probability that any given link flips its `enabled` flag on a tick.
pub const LINK_FLIP_PROBABILITY: f64 = 0.05;

/// Degrees of longitude drift per second of wall-clock time, before the
/// speed multiplier. Ground stations don't move.
fn deg_per_sec(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Sat => 0.06,
        NodeKind::Air => 0.01,
        NodeKind::Sea => 0.002,
        NodeKind::Ground => 0.0,
    }
}

/// Maximum per-tick lat/lon jitter (degrees) for airborne/maritime nodes.
const JITTER_DEG: f64 = 0.01;

/// Advance one epoch: mutate node positions in place, then flip link
/// `enabled` flags. `multiplier` scales position drift (see
/// `/simulate/set-speed`); it has no effect on the flip probability.
pub fn tick(graph: &mut GraphState, epoch_sec: u64, multiplier: f64, rng: &mut impl Rng) {
    let dt = epoch_sec as f64 * multiplier;
    for node in &mut graph.nodes {
        let rate = deg_per_sec(node.kind);
        if rate != 0.0 {
            node.lon = sagsin_common::models::Node::normalize_lon(node.lon + rate * dt);
        }
        if matches!(node.kind, NodeKind::Air | NodeKind::Sea) {
            node.lat = (node.lat + (rng.random::<f64>() - 0.5) * 2.0 * JITTER_DEG).clamp(-90.0, 90.0);
            node.lon = sagsin_common::models::Node::normalize_lon(
                node.lon + (rng.random::<f64>() - 0.5) * 2.0 * JITTER_DEG,
            );
        }
    }

    for link in &mut graph.links {
        if rng.random::<f64>() < LINK_FLIP_PROBABILITY {
            link.enabled = !link.enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sagsin_common::models::{Link, Node};

    fn node(id: i32, kind: NodeKind, lon: f64) -> Node {
        Node { id, kind, lat: 0.0, lon, alt_m: 0.0, name: String::new() }
    }

    #[test]
    fn ground_nodes_never_drift() {
        let mut gs = GraphState::new(vec![node(0, NodeKind::Ground, 10.0)], vec![]);
        let mut rng = StdRng::seed_from_u64(1);
        tick(&mut gs, 10, 1.0, &mut rng);
        assert_eq!(gs.nodes[0].lon, 10.0);
    }

    #[test]
    fn satellite_drifts_eastward_over_time() {
        let mut gs = GraphState::new(vec![node(0, NodeKind::Sat, 0.0)], vec![]);
        let mut rng = StdRng::seed_from_u64(1);
        tick(&mut gs, 100, 1.0, &mut rng);
        assert!(gs.nodes[0].lon > 0.0);
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let nodes = vec![node(0, NodeKind::Sat, 0.0), node(1, NodeKind::Air, 5.0)];
        let links = vec![Link { u: 0, v: 1, latency_ms: 1.0, capacity_mbps: 1.0, energy_j: 0.0, reliability: 1.0, enabled: true }];

        let mut a = GraphState::new(nodes.clone(), links.clone());
        let mut rng_a = StdRng::seed_from_u64(7);
        tick(&mut a, 10, 1.0, &mut rng_a);

        let mut b = GraphState::new(nodes, links);
        let mut rng_b = StdRng::seed_from_u64(7);
        tick(&mut b, 10, 1.0, &mut rng_b);

        assert_eq!(a.nodes[0].lon, b.nodes[0].lon);
        assert_eq!(a.nodes[1].lat, b.nodes[1].lat);
        assert_eq!(a.links[0].enabled, b.links[0].enabled);
    }
}
