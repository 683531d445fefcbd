use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Runtime settings for a dashboard core session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Simulated network latency before the initial bulk load (ms).
    pub initial_load_delay_ms: u64,

    /// Period of the simulated price feed (ms).
    pub tick_interval_ms: u64,

    /// Bound of the per-tick multiplicative price change (0.03 = ±3%).
    pub max_price_change: f64,

    /// Number of records the mock data source generates.
    pub initial_record_count: usize,

    /// Seed for the simulated feed and mock data. `None` uses entropy.
    pub feed_seed: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            initial_load_delay_ms: 800,
            tick_interval_ms: 50,
            max_price_change: 0.03,
            initial_record_count: 60,
            feed_seed: None,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `PULSE_*` environment variables.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            initial_load_delay_ms: env_or("PULSE_LOAD_DELAY_MS", defaults.initial_load_delay_ms),
            tick_interval_ms: env_or("PULSE_TICK_MS", defaults.tick_interval_ms),
            max_price_change: env_or("PULSE_MAX_CHANGE", defaults.max_price_change),
            initial_record_count: env_or("PULSE_RECORD_COUNT", defaults.initial_record_count),
            feed_seed: std::env::var("PULSE_FEED_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tick_interval_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "tick_interval_ms must be greater than zero".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.max_price_change) {
            return Err(CoreError::InvalidConfig(format!(
                "max_price_change must be in [0, 1), got {}",
                self.max_price_change
            )));
        }
        Ok(())
    }

    pub fn initial_load_delay(&self) -> Duration {
        Duration::from_millis(self.initial_load_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
