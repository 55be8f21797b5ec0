//! Multi-objective edge cost.
//!
//! Each enabled link carries four raw metrics — latency, inverse
//! capacity, energy, and unreliability — that live on incomparable
//! scales. [`compute_edge_costs`] min-max normalizes each metric across
//! the whole enabled edge set into `[0, 1]`, then combines them with the
//! configured weights into a single scalar cost the solver minimizes.

use sagsin_common::config::AcoConfig;
use sagsin_common::models::GraphState;

/// A small positive floor added to every cost so no edge is ever free —
/// a zero-cost edge would make the pseudo-random proportional rule's
/// desirability (`1/cost`) blow up.
const COST_FLOOR: f64 = 1e-6;

/// Per-edge cost, indexed the same way as [`GraphState::edge_index`].
#[derive(Debug, Clone)]
pub struct EdgeCosts {
    costs: Vec<f64>,
}

impl EdgeCosts {
    /// The cost of the edge at `link_idx` (an `edge_index` value).
    pub fn get(&self, link_idx: usize) -> f64 {
        self.costs[link_idx]
    }
}

fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / span).collect()
}

/// Compute the weighted, normalized cost of every enabled link in `graph`.
/// Each metric is min-max normalized over the enabled edge set only, so a
/// single disabled outlier link can't skew every other edge's cost.
/// Disabled links get no meaningful entry — `enabled_neighbors` keeps the
/// solver from ever traversing them, so their slot is never read.
pub fn compute_edge_costs(graph: &GraphState, cfg: &AcoConfig) -> EdgeCosts {
    let n = graph.links.len();
    if n == 0 {
        return EdgeCosts { costs: Vec::new() };
    }

    let enabled_idx: Vec<usize> = (0..n).filter(|&i| graph.links[i].enabled).collect();

    let latency: Vec<f64> = enabled_idx.iter().map(|&i| graph.links[i].latency_ms).collect();
    let inv_capacity: Vec<f64> = enabled_idx
        .iter()
        .map(|&i| 1.0 / graph.links[i].capacity_mbps.max(COST_FLOOR))
        .collect();
    let energy: Vec<f64> = enabled_idx.iter().map(|&i| graph.links[i].energy_j).collect();
    let unreliability: Vec<f64> = enabled_idx.iter().map(|&i| 1.0 - graph.links[i].reliability).collect();

    let norm_latency = min_max_normalize(&latency);
    let norm_inv_capacity = min_max_normalize(&inv_capacity);
    let norm_energy = min_max_normalize(&energy);
    let norm_unreliability = min_max_normalize(&unreliability);

    let [a, b, c, d] = cfg.weights;
    let mut costs = vec![f64::INFINITY; n];
    for (k, &idx) in enabled_idx.iter().enumerate() {
        costs[idx] = a * norm_latency[k]
            + b * norm_inv_capacity[k]
            + c * norm_energy[k]
            + d * norm_unreliability[k]
            + COST_FLOOR;
    }

    EdgeCosts { costs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagsin_common::models::{Link, Node, NodeKind};

    fn node(id: i32) -> Node {
        Node {
            id,
            kind: NodeKind::Ground,
            lat: 0.0,
            lon: 0.0,
            alt_m: 0.0,
            name: String::new(),
        }
    }

    fn link(u: i32, v: i32, latency_ms: f64, capacity_mbps: f64) -> Link {
        Link {
            u,
            v,
            latency_ms,
            capacity_mbps,
            energy_j: 1.0,
            reliability: 1.0,
            enabled: true,
        }
    }

    #[test]
    fn all_equal_links_cost_only_the_floor() {
        let gs = GraphState::new(
            vec![node(0), node(1), node(2)],
            vec![link(0, 1, 5.0, 10.0), link(1, 2, 5.0, 10.0)],
        );
        let costs = compute_edge_costs(&gs, &AcoConfig::default());
        assert!((costs.get(0) - COST_FLOOR).abs() < 1e-12);
        assert!((costs.get(1) - COST_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn higher_latency_edge_costs_more() {
        let gs = GraphState::new(
            vec![node(0), node(1), node(2)],
            vec![link(0, 1, 1.0, 10.0), link(1, 2, 100.0, 10.0)],
        );
        let costs = compute_edge_costs(&gs, &AcoConfig::default());
        assert!(costs.get(1) > costs.get(0));
    }

    #[test]
    fn single_link_graph_normalizes_to_zero_span() {
        let gs = GraphState::new(vec![node(0), node(1)], vec![link(0, 1, 5.0, 10.0)]);
        let costs = compute_edge_costs(&gs, &AcoConfig::default());
        assert!((costs.get(0) - COST_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn disabled_outlier_link_does_not_skew_enabled_links_normalization() {
        let mut disabled = link(1, 2, 10_000.0, 10.0);
        disabled.enabled = false;
        let gs = GraphState::new(
            vec![node(0), node(1), node(2)],
            vec![link(0, 1, 5.0, 10.0), disabled],
        );
        let costs = compute_edge_costs(&gs, &AcoConfig::default());
        assert!((costs.get(0) - COST_FLOOR).abs() < 1e-12);
    }
}
