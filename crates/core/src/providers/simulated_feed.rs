use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::intent::Intent;
use crate::models::store::RecordStore;

use super::traits::PriceFeed;

/// Fabricates price movement: each tick reprices one random record by a
/// factor drawn from `[1 - max_change, 1 + max_change)`.
#[derive(Debug)]
pub struct SimulatedFeed {
    rng: StdRng,
    max_change: f64,
}

impl SimulatedFeed {
    pub fn new(max_change: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_change,
        }
    }

    /// Deterministic feed for tests and replays.
    pub fn with_seed(max_change: f64, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_change,
        }
    }

    pub fn max_change(&self) -> f64 {
        self.max_change
    }

    fn draw_factor(&mut self) -> f64 {
        if self.max_change > 0.0 {
            1.0 + self.rng.gen_range(-self.max_change..self.max_change)
        } else {
            1.0
        }
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new(0.03)
    }
}

impl PriceFeed for SimulatedFeed {
    fn name(&self) -> &str {
        "SimulatedFeed"
    }

    fn next_update(&mut self, records: &RecordStore) -> Option<Intent> {
        if records.is_empty() {
            return None;
        }
        let pos = self.rng.gen_range(0..records.len());
        let token = records.records().get(pos)?;
        let factor = self.draw_factor();

        Some(Intent::UpdatePrice {
            id: token.id.clone(),
            price: token.price * factor,
            market_cap: token.market_cap * factor,
        })
    }
}
