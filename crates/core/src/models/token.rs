use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a token record. Assigned at creation, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TokenId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The dashboard column a token is displayed in.
/// Fixed at creation; tokens never move between categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Freshly launched pairs, early on the bonding curve
    NewPairs,
    /// Close to completing the bonding curve
    FinalStretch,
    /// Bonding curve complete, liquidity migrated
    Migrated,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [
        Category::NewPairs,
        Category::FinalStretch,
        Category::Migrated,
    ];

    /// Column heading shown by the display layer.
    pub fn title(&self) -> &'static str {
        match self {
            Category::NewPairs => "New Pairs",
            Category::FinalStretch => "Final Stretch",
            Category::Migrated => "Migrated",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::NewPairs => write!(f, "new_pairs"),
            Category::FinalStretch => write!(f, "final_stretch"),
            Category::Migrated => write!(f, "migrated"),
        }
    }
}

/// Direction of the most recent price change, used for up/down flashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMove {
    Up,
    Down,
    Unchanged,
}

/// Descriptive and scoring fields. Static after creation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub image_url: String,
    /// Bonding curve progress, 0 to 100
    pub bonding_curve: u8,
    /// Percentage of supply held by the developer
    pub dev_holding: f64,
    /// Percentage of supply held by insiders
    pub insider_holding: f64,
    pub holder_count: u32,
    pub liquidity: f64,
    pub txns_24h: u32,
    /// Human-readable age, e.g. "20m"
    pub time_since_launch: String,
    pub globe_score: u8,
    pub signal_score: u8,
    pub trophy_score: u8,
    pub flag: char,
    pub txns_today: u32,
    /// Buy pressure in percent
    pub buy_pressure: u8,
    /// Whale/liquidity status label, e.g. "DS 3mo"
    pub whale_activity: String,
    pub dev_score: u8,
    pub tax_buy: u8,
    pub tax_sell: u8,
}

/// One tracked token. Each price update produces a new version of the record;
/// a published version is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,

    /// Ticker symbol (e.g., "PEPE"), not unique across tokens
    pub ticker: String,

    pub name: String,

    /// Current price
    pub price: f64,

    /// The price immediately before the most recent update
    pub previous_price: f64,

    pub market_cap: f64,

    pub volume_24h: f64,

    pub category: Category,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub metrics: TokenMetrics,
}

impl Token {
    /// Create a token with default metrics and no price history
    /// (`previous_price == price`).
    pub fn new(
        id: impl Into<TokenId>,
        ticker: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        price: f64,
        market_cap: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
            name: name.into(),
            price,
            previous_price: price,
            market_cap,
            volume_24h: 0.0,
            category,
            created_at,
            metrics: TokenMetrics::default(),
        }
    }

    /// Next version of this record with a new price and market cap.
    /// The current price becomes `previous_price`.
    #[must_use]
    pub fn with_price(&self, price: f64, market_cap: f64) -> Self {
        Self {
            previous_price: self.price,
            price,
            market_cap,
            ..self.clone()
        }
    }

    pub fn price_move(&self) -> PriceMove {
        if self.price > self.previous_price {
            PriceMove::Up
        } else if self.price < self.previous_price {
            PriceMove::Down
        } else {
            PriceMove::Unchanged
        }
    }

    /// Case-insensitive substring match against ticker or name.
    /// `needle_lower` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle_lower: &str) -> bool {
        self.ticker.to_lowercase().contains(needle_lower)
            || self.name.to_lowercase().contains(needle_lower)
    }

    /// Case-insensitive substring match against ticker or name.
    pub fn matches(&self, query: &str) -> bool {
        self.matches_lowercase(&query.to_lowercase())
    }
}
