//! Graph builder: turns a node list into a fresh [`GraphState`].
//!
//! Deterministic and quadratic in node count: for every unordered pair,
//! gate on kind-pair max range, then on line-of-sight, then compute the
//! link budget — grounded on the reference implementation's
//! `net/updater.py::rebuild_from_nodes`.

use sagsin_common::config::{Config, LosVariant};
use sagsin_common::models::{GraphState, Link, Node, NodeKind};
use sagsin_geo::{elevation_angle_deg, line_of_sight, link_budget, node_distance_km};

/// Two terrestrial (ground/sea) nodes skip the geometric LOS test
/// entirely: both horizon-sum and segment-vs-sphere treat them as
/// sitting on the same sphere, which makes any two non-co-located
/// surface points geometrically invisible to each other regardless of
/// distance. Range gating (`max_range_km`) already bounds these links;
/// the geometric test only matters once one endpoint has real altitude.
fn los_ok(cfg: &Config, a: &Node, b: &Node) -> bool {
    let both_terrestrial = matches!(a.kind, NodeKind::Ground | NodeKind::Sea)
        && matches!(b.kind, NodeKind::Ground | NodeKind::Sea);
    if both_terrestrial {
        return true;
    }
    let geometric = match cfg.los_variant {
        LosVariant::SegmentVsSphere => line_of_sight(a, b),
        LosVariant::HorizonSum => sagsin_geo::geo::horizon_visible(a, b),
    };
    geometric && meets_elevation_mask(cfg, a, b)
}

/// `elevation_min_deg` models a ground/sea station's minimum usable
/// elevation angle toward an airborne or orbital platform — it doesn't
/// apply between two surface nodes, which have no such mask in practice.
fn meets_elevation_mask(cfg: &Config, a: &Node, b: &Node) -> bool {
    let (surface, elevated) = if a.alt_m <= b.alt_m { (a, b) } else { (b, a) };
    let surface_is_terrestrial = matches!(surface.kind, NodeKind::Ground | NodeKind::Sea);
    let elevated_is_airborne = matches!(elevated.kind, NodeKind::Sat | NodeKind::Air);
    if !(surface_is_terrestrial && elevated_is_airborne) {
        return true;
    }
    elevation_angle_deg(surface, elevated) >= cfg.elevation_min_deg
}

/// Build a fresh `GraphState` from `nodes` under `cfg`'s range/LOS/link
/// budget parameters.
pub fn build_graph(nodes: Vec<Node>, cfg: &Config) -> GraphState {
    let mut links = Vec::new();

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let (a, b) = (&nodes[i], &nodes[j]);
            let max_range = cfg.max_range(a.kind, b.kind);
            if max_range <= 0.0 {
                continue;
            }
            let distance_km = node_distance_km(a, b);
            if distance_km > max_range {
                continue;
            }
            if !los_ok(cfg, a, b) {
                continue;
            }

            let budget = link_budget(distance_km, a.kind, b.kind, &cfg.link_model);
            let (u, v) = if a.id < b.id { (a.id, b.id) } else { (b.id, a.id) };
            links.push(Link {
                u,
                v,
                latency_ms: budget.latency_ms,
                capacity_mbps: budget.capacity_mbps,
                energy_j: budget.energy_j,
                reliability: budget.reliability,
                enabled: true,
            });
        }
    }

    GraphState::new(nodes, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagsin_common::models::NodeKind;

    fn node(id: i32, kind: NodeKind, lat: f64, lon: f64, alt_m: f64) -> Node {
        Node { id, kind, lat, lon, alt_m, name: String::new() }
    }

    #[test]
    fn seed_graph_has_direct_ground_to_ground_link() {
        let nodes = vec![
            node(0, NodeKind::Ground, 0.0, 0.0, 0.0),
            node(1, NodeKind::Ground, 0.0, 0.1, 0.0),
            node(2, NodeKind::Sat, 0.0, 0.2, 550_000.0),
        ];
        let cfg = Config::default();
        let gs = build_graph(nodes, &cfg);
        assert!(gs.link_between(0, 1).is_some());
        assert!(gs.link_between(0, 2).is_some());
    }

    #[test]
    fn out_of_range_pair_has_no_link() {
        let nodes = vec![
            node(0, NodeKind::Ground, 0.0, 0.0, 0.0),
            node(1, NodeKind::Ground, 0.0, 170.0, 0.0),
        ];
        let cfg = Config::default();
        let gs = build_graph(nodes, &cfg);
        assert!(gs.link_between(0, 1).is_none());
    }

    #[test]
    fn unconfigured_kind_pair_never_links() {
        let nodes = vec![
            node(0, NodeKind::Sea, 0.0, 0.0, 0.0),
            node(1, NodeKind::Sat, 0.0, 0.01, 550_000.0),
        ];
        let cfg = Config::default();
        let gs = build_graph(nodes, &cfg);
        // "sea:sat" is not in the default max_range_km table.
        assert!(gs.link_between(0, 1).is_none());
    }

    #[test]
    fn canonical_link_endpoints_are_ordered() {
        let nodes = vec![
            node(5, NodeKind::Ground, 0.0, 0.0, 0.0),
            node(2, NodeKind::Ground, 0.0, 0.1, 0.0),
        ];
        let cfg = Config::default();
        let gs = build_graph(nodes, &cfg);
        let link = gs.link_between(2, 5).unwrap();
        assert_eq!((link.u, link.v), (2, 5));
    }

    #[test]
    fn low_elevation_aircraft_is_masked_but_not_ground_to_ground() {
        let nodes = || {
            vec![
                node(0, NodeKind::Ground, 0.0, 0.0, 0.0),
                node(1, NodeKind::Air, 0.0, 3.15, 10_000.0), // ~350km away, grazing elevation
            ]
        };

        let mut cfg = Config::default();
        assert!(build_graph(nodes(), &cfg).link_between(0, 1).is_none());

        cfg.elevation_min_deg = 0.0;
        assert!(build_graph(nodes(), &cfg).link_between(0, 1).is_some());
    }
}
