//! Distance and visibility primitives over a spherical Earth.
//!
//! The reference model treats Earth as a sphere of radius
//! [`EARTH_RADIUS_KM`] rather than the WGS84 ellipsoid — adequate for
//! link-budget purposes at the altitudes and ranges this network covers
//! (ground stations through low-earth-orbit satellites).

use sagsin_common::models::Node;

/// Mean Earth radius, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two `(lat, lon)` points in degrees, km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Node-to-node great-circle distance, km. Ignores altitude — used only
/// as the slant-range proxy for the link budget, not for LOS.
pub fn node_distance_km(a: &Node, b: &Node) -> f64 {
    haversine_km(a.lat, a.lon, b.lat, b.lon)
}

/// Earth-Centered Earth-Fixed position (km) for a spherical Earth, given
/// geodetic latitude/longitude in degrees and altitude in meters.
pub fn ecef_from_geodetic(lat_deg: f64, lon_deg: f64, alt_m: f64) -> (f64, f64, f64) {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let r = EARTH_RADIUS_KM + alt_m / 1000.0;
    let x = r * lat.cos() * lon.cos();
    let y = r * lat.cos() * lon.sin();
    let z = r * lat.sin();
    (x, y, z)
}

/// Line-of-sight test between two nodes: true if the straight segment
/// between their ECEF positions does not dip below the Earth's surface,
/// i.e. the segment's closest approach to the planet's center is at
/// least `EARTH_RADIUS_KM`.
///
/// This is the exact 3-D variant; [`horizon_visible`] is the cheaper
/// horizon-sum approximation used when only altitudes (not full ECEF
/// geometry) are available.
pub fn line_of_sight(a: &Node, b: &Node) -> bool {
    let (ax, ay, az) = ecef_from_geodetic(a.lat, a.lon, a.alt_m);
    let (bx, by, bz) = ecef_from_geodetic(b.lat, b.lon, b.alt_m);
    segment_clears_sphere((ax, ay, az), (bx, by, bz), EARTH_RADIUS_KM)
}

/// Closest-approach-to-origin test for the segment `p0..p1` against a
/// sphere of radius `radius` centered at the origin. Returns `true` when
/// the segment never enters the sphere (endpoints sit on or above it).
fn segment_clears_sphere(p0: (f64, f64, f64), p1: (f64, f64, f64), radius: f64) -> bool {
    let d = (p1.0 - p0.0, p1.1 - p0.1, p1.2 - p0.2);
    let dot_dd = d.0 * d.0 + d.1 * d.1 + d.2 * d.2;
    if dot_dd < 1e-12 {
        return (p0.0 * p0.0 + p0.1 * p0.1 + p0.2 * p0.2).sqrt() >= radius;
    }
    let dot_p0d = p0.0 * d.0 + p0.1 * d.1 + p0.2 * d.2;
    let t = (-dot_p0d / dot_dd).clamp(0.0, 1.0);
    let closest = (p0.0 + t * d.0, p0.1 + t * d.1, p0.2 + t * d.2);
    let dist = (closest.0 * closest.0 + closest.1 * closest.1 + closest.2 * closest.2).sqrt();
    dist >= radius
}

/// Radio horizon distance for an observer at altitude `h` meters above a
/// sphere of radius [`EARTH_RADIUS_KM`]: `d_hor(h) = sqrt(2*R*h + h^2)`, km.
pub fn horizon_distance_km(alt_m: f64) -> f64 {
    let r_m = EARTH_RADIUS_KM * 1000.0;
    let h = alt_m.max(0.0);
    (2.0 * r_m * h + h * h).sqrt() / 1000.0
}

/// Horizon-sum visibility: two nodes can see each other if the
/// great-circle distance between them is no greater than the sum of
/// their individual radio horizons. Cheaper than [`line_of_sight`] and
/// used as the default visibility test; both should agree for the
/// altitude ranges this network models.
pub fn horizon_visible(a: &Node, b: &Node) -> bool {
    let range = node_distance_km(a, b);
    range <= horizon_distance_km(a.alt_m) + horizon_distance_km(b.alt_m)
}

/// Elevation angle, degrees, of `target` above `observer`'s local
/// horizontal plane. Negative when `target` is below the horizon.
/// Used to apply a minimum-elevation mask for surface-to-elevated-
/// platform links (`Config::elevation_min_deg`) — horizon-sum and
/// segment-vs-sphere visibility alone don't rule out unusably low,
/// grazing-incidence links.
pub fn elevation_angle_deg(observer: &Node, target: &Node) -> f64 {
    let obs = ecef_from_geodetic(observer.lat, observer.lon, observer.alt_m);
    let tgt = ecef_from_geodetic(target.lat, target.lon, target.alt_m);
    let los = (tgt.0 - obs.0, tgt.1 - obs.1, tgt.2 - obs.2);
    let los_norm = (los.0 * los.0 + los.1 * los.1 + los.2 * los.2).sqrt();
    if los_norm < 1e-9 {
        return 90.0;
    }
    let obs_norm = (obs.0 * obs.0 + obs.1 * obs.1 + obs.2 * obs.2).sqrt();
    let cos_zenith = (los.0 * obs.0 + los.1 * obs.1 + los.2 * obs.2) / (los_norm * obs_norm);
    (cos_zenith.clamp(-1.0, 1.0)).asin().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sagsin_common::models::NodeKind;

    fn node(lat: f64, lon: f64, alt_m: f64) -> Node {
        Node {
            id: 0,
            kind: NodeKind::Ground,
            lat,
            lon,
            alt_m,
            name: String::new(),
        }
    }

    #[test]
    fn haversine_same_point_is_zero() {
        assert_relative_eq!(haversine_km(10.0, 20.0, 10.0, 20.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn haversine_quarter_meridian_is_about_earth_radius_times_half_pi() {
        let d = haversine_km(0.0, 0.0, 90.0, 0.0);
        assert_relative_eq!(d, EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2, epsilon = 1.0);
    }

    #[test]
    fn horizon_distance_grows_with_altitude() {
        assert!(horizon_distance_km(10_000.0) > horizon_distance_km(1_000.0));
        assert_eq!(horizon_distance_km(0.0), 0.0);
    }

    #[test]
    fn ground_to_ground_far_apart_is_not_horizon_visible() {
        let a = node(0.0, 0.0, 0.0);
        let b = node(0.0, 10.0, 0.0);
        assert!(!horizon_visible(&a, &b));
    }

    #[test]
    fn ground_to_leo_satellite_overhead_is_visible() {
        let ground = node(0.0, 0.0, 0.0);
        let sat = node(0.0, 0.0, 550_000.0);
        assert!(horizon_visible(&ground, &sat));
        assert!(line_of_sight(&ground, &sat));
    }

    #[test]
    fn line_of_sight_blocked_by_opposite_side_of_earth() {
        let a = node(0.0, 0.0, 0.0);
        let b = node(0.0, 180.0, 0.0);
        assert!(!line_of_sight(&a, &b));
    }

    #[test]
    fn elevation_overhead_satellite_is_near_ninety_degrees() {
        let ground = node(0.0, 0.0, 0.0);
        let sat = node(0.0, 0.0, 550_000.0);
        assert_relative_eq!(elevation_angle_deg(&ground, &sat), 90.0, epsilon = 0.1);
    }

    #[test]
    fn elevation_drops_as_satellite_moves_toward_the_horizon() {
        let ground = node(0.0, 0.0, 0.0);
        let near = node(0.0, 5.0, 550_000.0);
        let far = node(0.0, 40.0, 550_000.0);
        assert!(elevation_angle_deg(&ground, &near) > elevation_angle_deg(&ground, &far));
    }
}
