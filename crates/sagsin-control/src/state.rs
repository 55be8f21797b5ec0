//! Shared application state.
//!
//! `GraphState` lives behind a single `RwLock`, matching spec.md §5's
//! "single writer lock" shared-resource policy. Readers (route, nodes,
//! links) take a read guard; writers (epoch tick, toggle-link, reload)
//! take a write guard for the minimum duration needed.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sagsin_common::config::Config;
use sagsin_common::models::GraphState;
use tokio::sync::{Mutex, RwLock};

use crate::events::EventFabric;

/// State shared across all request handlers and the epoch timer task.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: RwLock<Config>,
    graph: RwLock<GraphState>,
    events: EventFabric,
    /// Injectable RNG for the epoch updater (spec.md §9 "Randomness").
    rng: Mutex<StdRng>,
    speed_multiplier: RwLock<f64>,
    start: Instant,
}

impl AppState {
    /// Build application state from an already-loaded config and graph.
    /// `seed: None` draws production entropy from `rand::rng()`; tests
    /// pass a fixed seed for determinism.
    pub fn new(config: Config, graph: GraphState, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::rng().random()),
        };
        Self {
            inner: Arc::new(Inner {
                config: RwLock::new(config),
                graph: RwLock::new(graph),
                events: EventFabric::new(),
                rng: Mutex::new(rng),
                speed_multiplier: RwLock::new(1.0),
                start: Instant::now(),
            }),
        }
    }

    pub fn config(&self) -> &RwLock<Config> {
        &self.inner.config
    }

    pub fn graph(&self) -> &RwLock<GraphState> {
        &self.inner.graph
    }

    pub fn events(&self) -> &EventFabric {
        &self.inner.events
    }

    pub fn rng(&self) -> &Mutex<StdRng> {
        &self.inner.rng
    }

    pub async fn speed_multiplier(&self) -> f64 {
        *self.inner.speed_multiplier.read().await
    }

    pub async fn set_speed_multiplier(&self, multiplier: f64) {
        *self.inner.speed_multiplier.write().await = multiplier;
    }

    /// Wall-clock seconds since this state was created, for
    /// [`crate::positions::drifted_positions`].
    pub fn elapsed_sec(&self) -> f64 {
        self.inner.start.elapsed().as_secs_f64()
    }
}
