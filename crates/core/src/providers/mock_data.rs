use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::CoreError;
use crate::models::token::{Category, Token, TokenId, TokenMetrics};

use super::traits::TokenSource;

const TICKERS: &[&str] = &[
    "PEPE", "WOJAK", "CHAD", "DOGE", "ELON", "MOON", "GPT", "AI", "SOL", "BONK", "TRUMP", "MAGA",
];
const NAMES: &[&str] = &[
    "BAOVERSE",
    "PUMPVERSE",
    "DegenX",
    "AlphaMeme",
    "TheCatalyst",
    "HyperDoge",
];
const IMAGES: &[&str] = &[
    "bg-red-500",
    "bg-blue-600",
    "bg-green-500",
    "bg-purple-600",
    "bg-yellow-500",
    "bg-pink-600",
    "bg-indigo-500",
    "bg-orange-600",
    "bg-teal-500",
    "bg-cyan-600",
];
const WHALE_ACTIVITIES: &[&str] = &["DS 3mo", "WL 1mo", "PS 6mo", "NO"];

/// Creation times are spread over the last hour.
const MAX_AGE_MS: i64 = 3_600_000;

/// Generates a plausible initial token set without any network access.
///
/// Ids are `token-0 .. token-{count-1}`. Roughly 40% of tokens land in
/// New Pairs, 35% in Final Stretch and 25% in Migrated, each with a
/// bonding-curve progress that fits its column.
#[derive(Debug, Clone)]
pub struct MockTokenSource {
    count: usize,
    seed: Option<u64>,
}

impl MockTokenSource {
    pub fn new(count: usize) -> Self {
        Self { count, seed: None }
    }

    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed: Some(seed),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Generate the records synchronously.
    pub fn generate(&self) -> Vec<Token> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = Utc::now();

        (0..self.count)
            .map(|i| {
                let r: f64 = rng.gen();
                let (category, bonding_curve) = if r > 0.4 && r < 0.75 {
                    (Category::FinalStretch, rng.gen_range(85..99))
                } else if r >= 0.75 {
                    (Category::Migrated, 100)
                } else {
                    (Category::NewPairs, rng.gen_range(0..30))
                };

                let price = 0.000_001 + rng.gen::<f64>() * 0.0001;
                let previous_price = 0.000_001 + rng.gen::<f64>() * 0.0001;

                Token {
                    id: TokenId::new(format!("token-{i}")),
                    ticker: pick(&mut rng, TICKERS).to_string(),
                    name: pick(&mut rng, NAMES).to_string(),
                    price,
                    previous_price,
                    market_cap: 1000.0 + rng.gen::<f64>() * 50_000.0,
                    volume_24h: 500.0 + rng.gen::<f64>() * 15_000.0,
                    category,
                    created_at: now - Duration::milliseconds(rng.gen_range(0..MAX_AGE_MS)),
                    metrics: TokenMetrics {
                        image_url: pick(&mut rng, IMAGES).to_string(),
                        bonding_curve,
                        dev_holding: rng.gen::<f64>() * 20.0,
                        insider_holding: rng.gen::<f64>() * 30.0,
                        holder_count: rng.gen_range(50..2050),
                        liquidity: 1000.0 + rng.gen::<f64>() * 50_000.0,
                        txns_24h: rng.gen_range(50..5050),
                        time_since_launch: format!("{}m", rng.gen_range(0..60u32)),
                        globe_score: rng.gen_range(0..5),
                        signal_score: rng.gen_range(0..3),
                        trophy_score: 0,
                        flag: if rng.gen_bool(0.5) { 'F' } else { 'T' },
                        txns_today: rng.gen_range(0..10),
                        buy_pressure: rng.gen_range(20..80),
                        whale_activity: pick(&mut rng, WHALE_ACTIVITIES).to_string(),
                        dev_score: rng.gen_range(0..10),
                        tax_buy: rng.gen_range(0..50),
                        tax_sell: rng.gen_range(0..50),
                    },
                }
            })
            .collect()
    }
}

impl Default for MockTokenSource {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl TokenSource for MockTokenSource {
    fn name(&self) -> &str {
        "MockTokenSource"
    }

    async fn fetch_initial(&self) -> Result<Vec<Token>, CoreError> {
        Ok(self.generate())
    }
}

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}
