//! Runtime configuration, loaded from a TOML file (`CONFIG_PATH`, default
//! `config.toml`) with field-by-field defaults matching the reference
//! implementation's `config.yaml` (§6.3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::NodeKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub epoch_sec: u64,
    pub enable_sat: bool,
    pub enable_air: bool,
    pub enable_ground: bool,
    pub enable_sea: bool,
    /// Keyed by `NodeKind::pair_key`, e.g. `"ground:sat"`.
    pub max_range_km: HashMap<String, f64>,
    pub elevation_min_deg: f64,
    /// Which of the two equivalent LOS tests the graph builder uses.
    pub los_variant: LosVariant,
    pub aco: AcoConfig,
    pub link_model: LinkModelConfig,
    /// Data-adapter knobs. The core only stores and passes these through —
    /// no adapter lives in this repo (see spec.md §1 Out of scope).
    pub cache_ttl_sec: u64,
    pub http_timeout_sec: u64,
    pub http_retries: u32,
    pub backoff_factor: f64,
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut max_range_km = HashMap::new();
        for (pair, km) in [
            ("ground:ground", 80.0),
            ("ground:sea", 80.0),
            ("sea:sea", 120.0),
            ("ground:air", 400.0),
            ("air:sea", 400.0),
            ("air:air", 600.0),
            ("ground:sat", 2500.0),
            ("sat:sea", 2500.0),
            ("air:sat", 3000.0),
            ("sat:sat", 6000.0),
        ] {
            max_range_km.insert(pair.to_string(), km);
        }

        Self {
            epoch_sec: 10,
            enable_sat: true,
            enable_air: true,
            enable_ground: true,
            enable_sea: false,
            max_range_km,
            elevation_min_deg: 10.0,
            los_variant: LosVariant::HorizonSum,
            aco: AcoConfig::default(),
            link_model: LinkModelConfig::default(),
            cache_ttl_sec: 86_400,
            http_timeout_sec: 10,
            http_retries: 3,
            backoff_factor: 0.6,
            offline: false,
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults (with a warning)
    /// when the file is absent.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path, "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Maximum admissible range (km) for a pair of node kinds, or `0.0`
    /// (no link) if the pair is unconfigured.
    pub fn max_range(&self, a: NodeKind, b: NodeKind) -> f64 {
        self.max_range_km
            .get(&NodeKind::pair_key(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_enabled(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Sat => self.enable_sat,
            NodeKind::Air => self.enable_air,
            NodeKind::Ground => self.enable_ground,
            NodeKind::Sea => self.enable_sea,
        }
    }
}

/// The two LOS tests documented in spec.md §4.1 are mathematically
/// equivalent; this selects which one `sagsin-geo` runs at graph-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosVariant {
    HorizonSum,
    SegmentVsSphere,
}

/// ACO solver knobs (§4.5, §6.3 `aco.*`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    pub ants: u32,
    pub iters: u32,
    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    pub xi: f64,
    pub q0: f64,
    pub tau0: f64,
    pub mmas: bool,
    pub tau_min: f64,
    pub tau_max: f64,
    pub weights: [f64; 4],
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            ants: 30,
            iters: 60,
            alpha: 1.0,
            beta: 3.0,
            rho: 0.2,
            xi: 0.1,
            q0: 0.2,
            tau0: 0.2,
            mmas: true,
            tau_min: 0.01,
            tau_max: 2.0,
            weights: [0.5, 0.2, 0.2, 0.1],
        }
    }
}

/// Link-budget model knobs (§4.1, §6.3 `link_model.*`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkModelConfig {
    pub freq_hz: f64,
    pub bw_hz: f64,
    pub p_tx_dbm: f64,
    pub noise_dbm: f64,
    pub proc_queue_ms: f64,
}

impl Default for LinkModelConfig {
    fn default() -> Self {
        Self {
            freq_hz: 2.4e9,
            bw_hz: 20e6,
            p_tx_dbm: 20.0,
            noise_dbm: -100.0,
            proc_queue_ms: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_aco_matches_reference_defaults() {
        let cfg = AcoConfig::default();
        assert_eq!(cfg.ants, 30);
        assert_eq!(cfg.iters, 60);
        assert_eq!(cfg.weights, [0.5, 0.2, 0.2, 0.1]);
        assert!(cfg.mmas);
    }

    #[test]
    fn load_missing_file_falls_back_to_default() {
        let cfg = Config::load("/nonexistent/path/config.toml").unwrap();
        assert_eq!(cfg.epoch_sec, 10);
    }

    #[test]
    fn max_range_unconfigured_pair_is_zero() {
        let cfg = Config::default();
        assert_eq!(cfg.max_range(NodeKind::Air, NodeKind::Ground), 400.0);
    }
}
