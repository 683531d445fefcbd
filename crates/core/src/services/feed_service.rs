use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::models::intent::Intent;
use crate::models::snapshot::Snapshot;
use crate::providers::traits::PriceFeed;

/// Drives a `PriceFeed` on a fixed tick once the initial load has finished.
///
/// The loop never fails observably: a skipped tick is logged at trace level,
/// and a closed dispatcher or snapshot channel simply ends it.
pub struct FeedService {
    feed: Box<dyn PriceFeed>,
    tick: Duration,
}

impl std::fmt::Debug for FeedService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedService")
            .field("feed", &self.feed.name())
            .field("tick", &self.tick)
            .finish()
    }
}

impl FeedService {
    pub fn new(feed: Box<dyn PriceFeed>, tick: Duration) -> Self {
        Self { feed, tick }
    }

    pub async fn run(
        mut self,
        mut snapshots: watch::Receiver<Snapshot>,
        intents: mpsc::UnboundedSender<Intent>,
    ) {
        // Wait for the bulk load before emitting anything.
        loop {
            let loading = snapshots.borrow_and_update().state.is_loading;
            if !loading {
                break;
            }
            if snapshots.changed().await.is_err() {
                return;
            }
        }

        tracing::debug!(feed = self.feed.name(), tick_ms = self.tick.as_millis() as u64, "Price feed started");

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.reset(); // skip immediate first tick

        loop {
            interval.tick().await;

            let records = snapshots.borrow().state.records.clone();
            match self.feed.next_update(&records) {
                Some(intent) => {
                    if intents.send(intent).is_err() {
                        tracing::debug!("Dispatcher closed, stopping price feed");
                        return;
                    }
                }
                None => tracing::trace!("Feed tick skipped"),
            }
        }
    }
}
