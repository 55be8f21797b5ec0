//! Ant Colony System route solver.
//!
//! Ants build candidate paths edge by edge using the pseudo-random
//! proportional rule (Dorigo & Gambardella), depositing pheromone locally
//! as they go and letting only the iteration's best path reinforce the
//! table globally — optionally clamped to `[tau_min, tau_max]` (MMAS).
//! Falls back to breadth-first search when no ant reaches the
//! destination within the configured budget.

use std::collections::{HashMap, VecDeque};

use rand::Rng;
use sagsin_common::config::AcoConfig;
use sagsin_common::models::GraphState;

use crate::objective::EdgeCosts;

/// A directed-edge pheromone table. Pheromone is tracked per direction
/// so a heavily-used forward hop doesn't bias the reverse direction.
#[derive(Debug, Clone)]
pub struct PheromoneTable {
    tau: HashMap<(i32, i32), f64>,
    tau0: f64,
}

impl PheromoneTable {
    pub fn new(graph: &GraphState, tau0: f64) -> Self {
        let mut tau = HashMap::new();
        for link in &graph.links {
            tau.insert((link.u, link.v), tau0);
            tau.insert((link.v, link.u), tau0);
        }
        Self { tau, tau0 }
    }

    fn get(&self, u: i32, v: i32) -> f64 {
        self.tau.get(&(u, v)).copied().unwrap_or(self.tau0)
    }

    /// Local update applied as an ant traverses `(u, v)`: pulls the edge's
    /// pheromone partway back toward `tau0`, discouraging other ants in
    /// the same iteration from piling onto the same edge.
    fn local_update(&mut self, u: i32, v: i32, xi: f64) {
        let t = self.get(u, v);
        self.tau.insert((u, v), (1.0 - xi) * t + xi * self.tau0);
    }

    /// Global update applied once per iteration on the best path found:
    /// deposits `rho * delta` and, under MMAS, clamps into `[tau_min, tau_max]`.
    fn global_update(&mut self, path: &[i32], delta: f64, cfg: &AcoConfig) {
        for w in path.windows(2) {
            let (u, v) = (w[0], w[1]);
            for &(a, b) in &[(u, v), (v, u)] {
                let mut t = (1.0 - cfg.rho) * self.get(a, b) + cfg.rho * delta;
                if cfg.mmas {
                    t = t.clamp(cfg.tau_min, cfg.tau_max);
                }
                self.tau.insert((a, b), t);
            }
        }
    }
}

/// Total cost of a path's edges, or `None` if any consecutive pair is
/// not a known edge.
fn path_cost(graph: &GraphState, costs: &EdgeCosts, path: &[i32]) -> Option<f64> {
    path.windows(2)
        .map(|w| graph.edge_index.get(&(w[0], w[1])).map(|&idx| costs.get(idx)))
        .sum()
}

/// Construct one ant's candidate path from `src` toward `dst` using the
/// pseudo-random proportional rule. Returns `None` if the ant gets stuck
/// (no unvisited enabled neighbor) before reaching `dst`.
fn construct_path(
    graph: &GraphState,
    costs: &EdgeCosts,
    pheromone: &mut PheromoneTable,
    cfg: &AcoConfig,
    src: i32,
    dst: i32,
    rng: &mut impl Rng,
) -> Option<Vec<i32>> {
    let mut path = vec![src];
    let mut visited: std::collections::HashSet<i32> = std::collections::HashSet::from([src]);
    let mut current = src;

    while current != dst {
        let candidates: Vec<i32> = graph
            .enabled_neighbors(current)
            .into_iter()
            .filter(|n| !visited.contains(n))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let weights: Vec<f64> = candidates
            .iter()
            .map(|&n| {
                let idx = graph.edge_index[&(current, n)];
                let eta = 1.0 / costs.get(idx);
                pheromone.get(current, n).powf(cfg.alpha) * eta.powf(cfg.beta)
            })
            .collect();

        let next = if rng.random::<f64>() < cfg.q0 {
            // Exploitation: highest-desirability candidate, ties broken by
            // the natural (first-seen) iteration order of the neighbors.
            let mut best_idx = 0;
            for (i, &w) in weights.iter().enumerate().skip(1) {
                if w > weights[best_idx] {
                    best_idx = i;
                }
            }
            candidates[best_idx]
        } else {
            // Exploration: roulette-wheel selection over the weights.
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                candidates[rng.random_range(0..candidates.len())]
            } else {
                let mut pick = rng.random::<f64>() * total;
                let mut chosen = candidates[candidates.len() - 1];
                for (&n, &w) in candidates.iter().zip(weights.iter()) {
                    if pick <= w {
                        chosen = n;
                        break;
                    }
                    pick -= w;
                }
                chosen
            }
        };

        pheromone.local_update(current, next, cfg.xi);
        visited.insert(next);
        path.push(next);
        current = next;
    }

    Some(path)
}

/// Breadth-first shortest-hop path, used when no ant reaches `dst`.
pub fn bfs_route(graph: &GraphState, src: i32, dst: i32) -> Option<Vec<i32>> {
    if src == dst {
        return Some(vec![src]);
    }
    let mut queue = VecDeque::from([src]);
    let mut came_from: HashMap<i32, i32> = HashMap::new();
    let mut visited: std::collections::HashSet<i32> = std::collections::HashSet::from([src]);

    while let Some(u) = queue.pop_front() {
        for v in graph.enabled_neighbors(u) {
            if visited.insert(v) {
                came_from.insert(v, u);
                if v == dst {
                    let mut path = vec![dst];
                    let mut cur = dst;
                    while let Some(&p) = came_from.get(&cur) {
                        path.push(p);
                        cur = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(v);
            }
        }
    }
    None
}

/// Run the ACO solver for `cfg.iters` iterations of `cfg.ants` ants each.
///
/// Returns `Some((path, cost))` for the best tour any ant completed, or
/// `None` if no ant ever reached `dst` — callers fall back to
/// [`bfs_route`] in that case. Pure: does not mutate `graph`.
pub fn solve(
    graph: &GraphState,
    costs: &EdgeCosts,
    cfg: &AcoConfig,
    src: i32,
    dst: i32,
    rng: &mut impl Rng,
) -> Option<(Vec<i32>, f64)> {
    if graph.node(src).is_none() || graph.node(dst).is_none() {
        return None;
    }
    if src == dst {
        return Some((vec![src], 0.0));
    }

    let mut pheromone = PheromoneTable::new(graph, cfg.tau0);
    let mut best_path: Option<Vec<i32>> = None;
    let mut best_cost = f64::INFINITY;

    for _ in 0..cfg.iters {
        let mut iter_best: Option<(Vec<i32>, f64)> = None;
        for _ in 0..cfg.ants {
            let Some(path) = construct_path(graph, costs, &mut pheromone, cfg, src, dst, rng) else {
                continue;
            };
            let Some(cost) = path_cost(graph, costs, &path) else {
                continue;
            };
            if iter_best.as_ref().map(|(_, c)| cost < *c).unwrap_or(true) {
                iter_best = Some((path, cost));
            }
        }

        if let Some((path, cost)) = iter_best {
            let delta = 1.0 / cost.max(1e-9);
            pheromone.global_update(&path, delta, cfg);
            if cost < best_cost {
                best_cost = cost;
                best_path = Some(path);
            }
        }
    }

    best_path.map(|path| (path, best_cost))
}

/// Run ACO, falling back to breadth-first search (cost left unset, since
/// BFS does not minimize the weighted objective) if no ant reached `dst`.
pub fn solve_route(
    graph: &GraphState,
    costs: &EdgeCosts,
    cfg: &AcoConfig,
    src: i32,
    dst: i32,
    rng: &mut impl Rng,
) -> Option<Vec<i32>> {
    if let Some((path, _)) = solve(graph, costs, cfg, src, dst, rng) {
        return Some(path);
    }
    bfs_route(graph, src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::compute_edge_costs;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
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

    fn chain_graph() -> GraphState {
        let nodes = vec![node(0), node(1), node(2), node(3)];
        let links = vec![
            Link { u: 0, v: 1, latency_ms: 1.0, capacity_mbps: 10.0, energy_j: 1.0, reliability: 1.0, enabled: true },
            Link { u: 1, v: 2, latency_ms: 1.0, capacity_mbps: 10.0, energy_j: 1.0, reliability: 1.0, enabled: true },
            Link { u: 2, v: 3, latency_ms: 1.0, capacity_mbps: 10.0, energy_j: 1.0, reliability: 1.0, enabled: true },
        ];
        GraphState::new(nodes, links)
    }

    #[test]
    fn bfs_finds_shortest_hop_path_on_a_chain() {
        let gs = chain_graph();
        let path = bfs_route(&gs, 0, 3).unwrap();
        assert_eq!(path, vec![0, 1, 2, 3]);
    }

    #[test]
    fn bfs_returns_none_when_disconnected() {
        let gs = GraphState::new(vec![node(0), node(1)], vec![]);
        assert!(bfs_route(&gs, 0, 1).is_none());
    }

    #[test]
    fn solver_finds_the_only_path_on_a_chain() {
        let gs = chain_graph();
        let cfg = AcoConfig { ants: 5, iters: 5, ..AcoConfig::default() };
        let costs = compute_edge_costs(&gs, &cfg);
        let mut rng = StdRng::seed_from_u64(42);
        let path = solve_route(&gs, &costs, &cfg, 0, 3, &mut rng).unwrap();
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&3));
    }

    #[test]
    fn solver_same_src_and_dst_is_trivial() {
        let gs = chain_graph();
        let cfg = AcoConfig::default();
        let costs = compute_edge_costs(&gs, &cfg);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(solve_route(&gs, &costs, &cfg, 2, 2, &mut rng), Some(vec![2]));
    }

    #[test]
    fn solver_falls_back_to_bfs_when_unreachable() {
        let nodes = vec![node(0), node(1), node(2)];
        let links = vec![Link { u: 0, v: 1, latency_ms: 1.0, capacity_mbps: 10.0, energy_j: 1.0, reliability: 1.0, enabled: true }];
        let gs = GraphState::new(nodes, links);
        let cfg = AcoConfig { ants: 3, iters: 3, ..AcoConfig::default() };
        let costs = compute_edge_costs(&gs, &cfg);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(solve_route(&gs, &costs, &cfg, 0, 2, &mut rng), None);
    }

    #[test]
    fn solve_returns_none_rather_than_bfs_when_ants_never_arrive() {
        let nodes = vec![node(0), node(1), node(2)];
        let links = vec![Link { u: 0, v: 1, latency_ms: 1.0, capacity_mbps: 10.0, energy_j: 1.0, reliability: 1.0, enabled: true }];
        let gs = GraphState::new(nodes, links);
        let cfg = AcoConfig { ants: 3, iters: 3, ..AcoConfig::default() };
        let costs = compute_edge_costs(&gs, &cfg);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(solve(&gs, &costs, &cfg, 0, 2, &mut rng), None);
    }

    #[test]
    fn aco_is_deterministic_under_a_fixed_seed() {
        let gs = chain_graph();
        let cfg = AcoConfig { ants: 10, iters: 10, ..AcoConfig::default() };
        let costs = compute_edge_costs(&gs, &cfg);
        let (path_a, cost_a) = solve(&gs, &costs, &cfg, 0, 3, &mut StdRng::seed_from_u64(99)).unwrap();
        let (path_b, cost_b) = solve(&gs, &costs, &cfg, 0, 3, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(path_a, path_b);
        assert_eq!(cost_a, cost_b);
    }
}
