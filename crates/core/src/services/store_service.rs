use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::models::intent::Intent;
use crate::models::snapshot::Snapshot;
use crate::models::state::AppState;
use crate::services::transition_service::TransitionService;
use crate::services::view_service::ViewService;

/// Single owner of the application state.
///
/// Every intent goes through `dispatch`, which runs the transition, derives
/// the views for the resulting state and publishes both as one `Snapshot`.
/// Subscribers therefore never see a state paired with stale views.
pub struct StoreService {
    state: Arc<AppState>,
    transitions: TransitionService,
    views: ViewService,
    publisher: watch::Sender<Snapshot>,
}

impl std::fmt::Debug for StoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreService")
            .field("records", &self.state.records.len())
            .field("is_loading", &self.state.is_loading)
            .field("recomputations", &self.views.recomputations())
            .field("subscribers", &self.publisher.receiver_count())
            .finish()
    }
}

impl StoreService {
    /// A store holding the initial (loading, empty) state.
    pub fn new() -> Self {
        Self::with_state(AppState::initial())
    }

    pub fn with_state(state: Arc<AppState>) -> Self {
        let mut views = ViewService::new();
        let snapshot = Snapshot {
            views: views.derive_for(&state),
            state: Arc::clone(&state),
        };
        let (publisher, _) = watch::channel(snapshot);
        Self {
            state,
            transitions: TransitionService::new(),
            views,
            publisher,
        }
    }

    /// Apply one intent. Returns `true` if the state changed and a new
    /// snapshot was published.
    pub fn dispatch(&mut self, intent: Intent) -> bool {
        let next = self.transitions.apply(&self.state, intent);
        if Arc::ptr_eq(&next, &self.state) {
            return false;
        }

        let views = self.views.derive_for(&next);
        self.state = Arc::clone(&next);
        self.publisher.send_replace(Snapshot { state: next, views });
        true
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.publisher.borrow().clone()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn view_recomputations(&self) -> u64 {
        self.views.recomputations()
    }

    /// Dispatcher loop: applies intents one at a time in arrival order.
    ///
    /// Stops when every sender is gone or `active` is cleared; an intent
    /// received after `active` is cleared is dropped unapplied.
    pub async fn run(mut self, mut intents: mpsc::UnboundedReceiver<Intent>, active: Arc<AtomicBool>) {
        while let Some(intent) = intents.recv().await {
            if !active.load(Ordering::Acquire) {
                tracing::debug!(intent = intent.kind(), "Dropping intent received after teardown");
                break;
            }
            let kind = intent.kind();
            if !self.dispatch(intent) {
                tracing::debug!(intent = kind, "Intent left state unchanged");
            }
        }
        tracing::debug!("Dispatcher stopped");
    }
}

impl Default for StoreService {
    fn default() -> Self {
        Self::new()
    }
}
