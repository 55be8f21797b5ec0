//! Geodesy and link-budget kernels for the SAGSIN connectivity graph.
//!
//! [`geo`] turns node positions into distances and visibility verdicts;
//! [`link`] turns a distance and a pair of node kinds into the physical
//! attributes ([`sagsin_common::models::Link`]'s `latency_ms`,
//! `capacity_mbps`, `energy_j`, `reliability`) that feed the solver's cost
//! function.

pub mod geo;
pub mod link;

pub use geo::{
    ecef_from_geodetic, elevation_angle_deg, haversine_km, line_of_sight, node_distance_km,
    EARTH_RADIUS_KM,
};
pub use link::link_budget;
