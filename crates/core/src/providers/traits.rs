use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::intent::Intent;
use crate::models::store::RecordStore;
use crate::models::token::Token;

/// Source of the initial record set.
///
/// Called exactly once per mounted session. Implementations must return
/// records with unique ids and a valid category each.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the full initial record set.
    async fn fetch_initial(&self) -> Result<Vec<Token>, CoreError>;
}

/// A live price feed, reduced to the intents it emits.
///
/// The simulated feed and a real market subscription implement the same
/// trait, so neither the transitions nor the views depend on which one runs.
pub trait PriceFeed: Send {
    fn name(&self) -> &str;

    /// Produce the next update against the current records, or `None`
    /// to skip this tick.
    fn next_update(&mut self, records: &RecordStore) -> Option<Intent>;
}
