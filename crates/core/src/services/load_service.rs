use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::models::intent::Intent;
use crate::providers::traits::TokenSource;

/// Performs the one-shot initial load: waits out the simulated latency,
/// fetches from the source and hands the records to the dispatcher.
pub struct LoadService {
    source: Arc<dyn TokenSource>,
    delay: Duration,
}

impl LoadService {
    pub fn new(source: Arc<dyn TokenSource>, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub async fn run(self, intents: mpsc::UnboundedSender<Intent>) {
        tokio::time::sleep(self.delay).await;

        match self.source.fetch_initial().await {
            Ok(tokens) => {
                tracing::info!(source = self.source.name(), count = tokens.len(), "Initial records fetched");
                if intents.send(Intent::BulkLoad(tokens)).is_err() {
                    tracing::debug!("Dispatcher closed before initial load");
                }
            }
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Initial load failed");
            }
        }
    }
}
