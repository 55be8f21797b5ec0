//! Ant Colony Optimization route solver for the SAGSIN connectivity graph.
//!
//! [`objective`] turns raw link attributes into a single normalized cost
//! per edge; [`solver`] runs the ant colony search (with a breadth-first
//! fallback) over those costs to find a route between two nodes.

pub mod objective;
pub mod solver;

pub use objective::{compute_edge_costs, EdgeCosts};
pub use solver::{bfs_route, solve, solve_route, PheromoneTable};
