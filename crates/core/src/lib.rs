pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use models::{
    intent::Intent,
    settings::CoreConfig,
    snapshot::Snapshot,
    state::{AppState, DisplayMode, SortKey},
    token::{Category, TokenId},
    views::CategorizedViews,
};
use providers::{
    mock_data::MockTokenSource,
    simulated_feed::SimulatedFeed,
    traits::{PriceFeed, TokenSource},
};
use services::{feed_service::FeedService, load_service::LoadService, store_service::StoreService};

use errors::CoreError;

/// Main entry point for the dashboard core.
///
/// Owns the session lifecycle: `mount` starts the dispatcher, the delayed
/// initial load and the price feed; `teardown` (or dropping the core) stops
/// all three. Consumers interact through the `DashboardHandle` returned by
/// `mount`.
#[must_use]
pub struct DashboardCore {
    config: CoreConfig,
    source: Arc<dyn TokenSource>,
    lifecycle: Lifecycle,
}

enum Lifecycle {
    Idle { feed: Box<dyn PriceFeed> },
    Mounted(Session),
    TornDown,
}

struct Session {
    handle: DashboardHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for DashboardCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lifecycle = match &self.lifecycle {
            Lifecycle::Idle { .. } => "idle",
            Lifecycle::Mounted(_) => "mounted",
            Lifecycle::TornDown => "torn_down",
        };
        f.debug_struct("DashboardCore")
            .field("source", &self.source.name())
            .field("lifecycle", &lifecycle)
            .field("config", &self.config)
            .finish()
    }
}

impl DashboardCore {
    /// Create an unmounted core backed by the mock data source and the
    /// simulated price feed.
    pub fn new(config: CoreConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let (source, feed) = match config.feed_seed {
            Some(seed) => (
                MockTokenSource::with_seed(config.initial_record_count, seed),
                SimulatedFeed::with_seed(config.max_price_change, seed),
            ),
            None => (
                MockTokenSource::new(config.initial_record_count),
                SimulatedFeed::new(config.max_price_change),
            ),
        };

        Ok(Self {
            config,
            source: Arc::new(source),
            lifecycle: Lifecycle::Idle {
                feed: Box::new(feed),
            },
        })
    }

    /// Replace the initial data source. Has no effect once mounted.
    pub fn with_source(mut self, source: impl TokenSource + 'static) -> Self {
        if matches!(self.lifecycle, Lifecycle::Idle { .. }) {
            self.source = Arc::new(source);
        }
        self
    }

    /// Replace the price feed. Has no effect once mounted.
    pub fn with_feed(mut self, feed: impl PriceFeed + 'static) -> Self {
        if let Lifecycle::Idle { feed: current } = &mut self.lifecycle {
            *current = Box::new(feed);
        }
        self
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Start the session on the current tokio runtime.
    ///
    /// The state starts loading and empty; the bulk load arrives after
    /// `initial_load_delay_ms`, and the feed starts ticking after that.
    pub fn mount(&mut self) -> Result<DashboardHandle, CoreError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CoreError::NoRuntime)?;

        let feed = match std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            Lifecycle::Idle { feed } => feed,
            Lifecycle::Mounted(session) => {
                self.lifecycle = Lifecycle::Mounted(session);
                return Err(CoreError::AlreadyMounted);
            }
            Lifecycle::TornDown => return Err(CoreError::TornDown),
        };

        let store = StoreService::new();
        let snapshots = store.subscribe();
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));

        let loader = LoadService::new(Arc::clone(&self.source), self.config.initial_load_delay());
        let ticker = FeedService::new(feed, self.config.tick_interval());

        let tasks = vec![
            runtime.spawn(store.run(intent_rx, Arc::clone(&active))),
            runtime.spawn(loader.run(intent_tx.clone())),
            runtime.spawn(ticker.run(snapshots.clone(), intent_tx.clone())),
        ];

        let handle = DashboardHandle {
            intents: intent_tx,
            snapshots,
            active,
        };

        tracing::info!(
            source = self.source.name(),
            load_delay_ms = self.config.initial_load_delay_ms,
            tick_ms = self.config.tick_interval_ms,
            "Dashboard core mounted"
        );

        self.lifecycle = Lifecycle::Mounted(Session {
            handle: handle.clone(),
            tasks,
        });
        Ok(handle)
    }

    /// A new handle to the mounted session.
    pub fn handle(&self) -> Result<DashboardHandle, CoreError> {
        match &self.lifecycle {
            Lifecycle::Mounted(session) => Ok(session.handle.clone()),
            Lifecycle::Idle { .. } => Err(CoreError::NotMounted),
            Lifecycle::TornDown => Err(CoreError::TornDown),
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Mounted(_))
    }

    /// Stop the feed, cancel a pending initial load and stop the dispatcher.
    /// Every handle fails with `TornDown` afterwards. Idempotent.
    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            Lifecycle::Mounted(session) => {
                // Cleared before aborting so nothing queued gets applied.
                session.handle.active.store(false, Ordering::Release);
                for task in session.tasks {
                    task.abort();
                }
                tracing::info!("Dashboard core torn down");
            }
            Lifecycle::Idle { .. } | Lifecycle::TornDown => {}
        }
    }
}

impl Drop for DashboardCore {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Consumer Handle ─────────────────────────────────────────────────

/// The context object the display layer holds: read the latest snapshot,
/// submit intents, wait for changes.
///
/// Every access fails with `CoreError::TornDown` once the core is torn down.
#[derive(Clone)]
pub struct DashboardHandle {
    intents: mpsc::UnboundedSender<Intent>,
    snapshots: watch::Receiver<Snapshot>,
    active: Arc<AtomicBool>,
}

impl std::fmt::Debug for DashboardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

impl DashboardHandle {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn ensure_active(&self) -> Result<(), CoreError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::TornDown)
        }
    }

    // ── Read surface ────────────────────────────────────────────────

    /// The latest state and the views derived from it.
    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        self.ensure_active()?;
        Ok(self.snapshots.borrow().clone())
    }

    pub fn state(&self) -> Result<Arc<AppState>, CoreError> {
        self.snapshot().map(|s| s.state)
    }

    pub fn views(&self) -> Result<Arc<CategorizedViews>, CoreError> {
        self.snapshot().map(|s| s.views)
    }

    /// Wait for the next published snapshot.
    pub async fn changed(&mut self) -> Result<Snapshot, CoreError> {
        self.ensure_active()?;
        self.snapshots
            .changed()
            .await
            .map_err(|_| CoreError::TornDown)?;
        self.ensure_active()?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Wait until a published snapshot satisfies `predicate`
    /// (checks the current one first).
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Result<Snapshot, CoreError> {
        loop {
            self.ensure_active()?;
            let current = self.snapshots.borrow_and_update().clone();
            if predicate(&current) {
                return Ok(current);
            }
            self.snapshots
                .changed()
                .await
                .map_err(|_| CoreError::TornDown)?;
        }
    }

    // ── Write surface ───────────────────────────────────────────────

    /// Queue an intent. Intents are applied one at a time in arrival order.
    pub fn dispatch(&self, intent: Intent) -> Result<(), CoreError> {
        self.ensure_active()?;
        self.intents.send(intent).map_err(|_| CoreError::TornDown)
    }

    pub fn set_filter(&self, filter: impl Into<String>) -> Result<(), CoreError> {
        self.dispatch(Intent::SetFilter(filter.into()))
    }

    pub fn set_sort(&self, sort_by: SortKey) -> Result<(), CoreError> {
        self.dispatch(Intent::SetSort(sort_by))
    }

    pub fn select(&self, id: impl Into<TokenId>) -> Result<(), CoreError> {
        self.dispatch(Intent::Select(Some(id.into())))
    }

    pub fn clear_selection(&self) -> Result<(), CoreError> {
        self.dispatch(Intent::Select(None))
    }

    pub fn set_display_mode(&self, category: Category, mode: DisplayMode) -> Result<(), CoreError> {
        self.dispatch(Intent::SetDisplayMode { category, mode })
    }

    /// Open the filter panel for `category`, or close it with `None`.
    pub fn open_filter_panel(&self, category: Option<Category>) -> Result<(), CoreError> {
        self.dispatch(Intent::OpenFilterPanel(category))
    }

    pub fn set_settings_open(&self, open: bool) -> Result<(), CoreError> {
        self.dispatch(Intent::SetSettingsOpen(open))
    }
}
