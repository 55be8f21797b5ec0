//! Link-budget kernel: turns a node pair and a distance into the
//! physical attributes stored on a [`sagsin_common::models::Link`].
//!
//! Formulas follow the reference link-budget model exactly:
//! `FSPL_dB = 20log10(d_km) + 20log10(f_Hz) - 147.55`,
//! `SNR_lin = 10^((P_tx - FSPL - N)/10)` clamped to `[1e-6, inf)`,
//! `capacity_Mbps = BW*log2(1+SNR_lin)/1e6`,
//! `latency_ms = d_km/299.792458 + proc_queue_ms`,
//! `energy_J = (10^(P_tx/10)/1000) * (latency_ms/1000) * kappa(kind)`,
//! `reliability = clamp(kappa_pair * max(0.1, 1 - d_km/5000), 0, 1)`.

use sagsin_common::config::LinkModelConfig;
use sagsin_common::models::NodeKind;

/// Speed of light, km/ms (== km/s / 1000).
const SPEED_OF_LIGHT_KM_PER_MS: f64 = 299.792458;

/// Smallest distance fed to the path-loss formula, so co-located nodes
/// (`d_km = 0`) don't send `log10` to negative infinity.
const MIN_FSPL_DISTANCE_KM: f64 = 1e-3;

/// The physical attributes derived for one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBudget {
    pub latency_ms: f64,
    pub capacity_mbps: f64,
    pub energy_j: f64,
    pub reliability: f64,
}

/// Free-space path loss in dB for a link of `distance_km` at `freq_hz`.
pub fn fspl_db(distance_km: f64, freq_hz: f64) -> f64 {
    let d = distance_km.max(MIN_FSPL_DISTANCE_KM);
    20.0 * d.log10() + 20.0 * freq_hz.log10() - 147.55
}

/// Linear SNR from the link budget, clamped to a small positive floor so
/// downstream `log2` never sees zero or a negative argument.
pub fn snr_linear(distance_km: f64, cfg: &LinkModelConfig) -> f64 {
    let loss_db = fspl_db(distance_km, cfg.freq_hz);
    let rx_dbm = cfg.p_tx_dbm - loss_db;
    let snr_db = rx_dbm - cfg.noise_dbm;
    (10f64.powf(snr_db / 10.0)).max(1e-6)
}

/// Shannon capacity in Mbps for the given bandwidth and SNR.
pub fn capacity_mbps(snr: f64, bw_hz: f64) -> f64 {
    bw_hz * (1.0 + snr).log2() / 1e6
}

/// Per-hop latency: propagation delay plus the node's fixed processing
/// and queueing overhead.
pub fn latency_ms(distance_km: f64, cfg: &LinkModelConfig) -> f64 {
    distance_km.max(0.0) / SPEED_OF_LIGHT_KM_PER_MS + cfg.proc_queue_ms
}

/// Per-hop transmit energy coefficient. Satellites and aircraft carry
/// higher-power transceivers than ground or maritime stations; a link's
/// coefficient is the larger of its two endpoint kinds'.
pub fn energy_coefficient(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Sat => 1.5,
        NodeKind::Air => 1.2,
        NodeKind::Ground | NodeKind::Sea => 1.0,
    }
}

fn energy_j(latency_ms: f64, a: NodeKind, b: NodeKind, cfg: &LinkModelConfig) -> f64 {
    let kappa = energy_coefficient(a).max(energy_coefficient(b));
    (10f64.powf(cfg.p_tx_dbm / 10.0) / 1000.0) * (latency_ms / 1000.0) * kappa
}

/// Reliability heuristic: degrades linearly with distance down to a
/// 0.1 floor, with satellite hops penalized by an extra 0.9 factor
/// (atmospheric and Doppler effects on the uplink/downlink).
pub fn reliability(distance_km: f64, a: NodeKind, b: NodeKind) -> f64 {
    let kappa_pair = if a == NodeKind::Sat || b == NodeKind::Sat {
        0.9
    } else {
        1.0
    };
    (kappa_pair * (1.0 - distance_km / 5000.0).max(0.1)).clamp(0.0, 1.0)
}

/// Compute the full link budget for a pair of node kinds separated by
/// `distance_km`.
pub fn link_budget(distance_km: f64, a: NodeKind, b: NodeKind, cfg: &LinkModelConfig) -> LinkBudget {
    let snr = snr_linear(distance_km, cfg);
    let latency = latency_ms(distance_km, cfg);
    LinkBudget {
        latency_ms: latency,
        capacity_mbps: capacity_mbps(snr, cfg.bw_hz),
        energy_j: energy_j(latency, a, b, cfg),
        reliability: reliability(distance_km, a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LinkModelConfig {
        LinkModelConfig {
            freq_hz: 2.4e9,
            bw_hz: 20e6,
            p_tx_dbm: 20.0,
            noise_dbm: -100.0,
            proc_queue_ms: 2.0,
        }
    }

    #[test]
    fn fspl_grows_with_distance() {
        assert!(fspl_db(1000.0, 2.4e9) > fspl_db(10.0, 2.4e9));
    }

    #[test]
    fn fspl_handles_zero_distance_without_blowing_up() {
        assert!(fspl_db(0.0, 2.4e9).is_finite());
    }

    #[test]
    fn snr_is_never_non_positive() {
        let snr = snr_linear(1_000_000.0, &cfg());
        assert!(snr >= 1e-6);
    }

    #[test]
    fn capacity_increases_with_snr() {
        assert!(capacity_mbps(100.0, 20e6) > capacity_mbps(1.0, 20e6));
    }

    #[test]
    fn latency_includes_proc_queue_floor() {
        let l = latency_ms(0.0, &cfg());
        assert_eq!(l, 2.0);
    }

    #[test]
    fn direct_hop_latency_matches_scenario_one() {
        // spec scenario 1: N0=(0,0,0), N1=(0,0.1,0); distance ~11.13 km
        let d = crate::geo::haversine_km(0.0, 0.0, 0.0, 0.1);
        let l = latency_ms(d, &cfg());
        assert!((l - (d / SPEED_OF_LIGHT_KM_PER_MS + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn satellite_hops_are_less_reliable_at_equal_distance() {
        assert!(reliability(100.0, NodeKind::Sat, NodeKind::Ground) < reliability(100.0, NodeKind::Ground, NodeKind::Sea));
    }

    #[test]
    fn reliability_floors_at_point_one_times_kappa() {
        assert!((reliability(1_000_000.0, NodeKind::Ground, NodeKind::Ground) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn energy_coefficient_uses_the_larger_endpoint() {
        let sat = energy_j(10.0, NodeKind::Sat, NodeKind::Ground, &cfg());
        let ground = energy_j(10.0, NodeKind::Ground, NodeKind::Ground, &cfg());
        assert!(sat > ground);
    }

    #[test]
    fn link_budget_bundles_all_four_fields() {
        let b = link_budget(500.0, NodeKind::Ground, NodeKind::Air, &cfg());
        assert!(b.latency_ms > 2.0);
        assert!(b.capacity_mbps > 0.0);
        assert!(b.energy_j > 0.0);
        assert!(b.reliability > 0.0 && b.reliability <= 1.0);
    }
}
