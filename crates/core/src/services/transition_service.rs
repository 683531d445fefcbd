use std::sync::Arc;

use crate::models::intent::Intent;
use crate::models::state::AppState;
use crate::models::store::RecordStore;

/// Applies intents to application state.
///
/// Pure business logic: `(state, intent) -> state`, no I/O, no clocks.
/// An ignored intent returns the input `Arc` itself, so callers can detect
/// a no-op with `Arc::ptr_eq`.
#[derive(Debug, Default)]
pub struct TransitionService;

impl TransitionService {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, state: &Arc<AppState>, intent: Intent) -> Arc<AppState> {
        match intent {
            Intent::BulkLoad(tokens) => {
                let records = RecordStore::from_records(tokens);
                tracing::info!(count = records.len(), "Bulk load applied");
                Arc::new(AppState {
                    records,
                    is_loading: false,
                    ..AppState::clone(state)
                })
            }

            Intent::UpdatePrice {
                id,
                price,
                market_cap,
            } => {
                if !is_valid_amount(price) || !is_valid_amount(market_cap) {
                    tracing::debug!(%id, price, market_cap, "Ignoring price update with invalid amounts");
                    return Arc::clone(state);
                }
                match state.records.with_price(&id, price, market_cap) {
                    Some(records) => {
                        tracing::trace!(%id, price, "Price updated");
                        Arc::new(AppState {
                            records,
                            ..AppState::clone(state)
                        })
                    }
                    None => {
                        tracing::debug!(%id, "Ignoring price update for unknown token");
                        Arc::clone(state)
                    }
                }
            }

            Intent::SetFilter(filter) => Arc::new(AppState {
                filter,
                ..AppState::clone(state)
            }),

            Intent::SetSort(sort_by) => Arc::new(AppState {
                sort_by,
                ..AppState::clone(state)
            }),

            Intent::Select(selected_id) => Arc::new(AppState {
                selected_id,
                ..AppState::clone(state)
            }),

            Intent::SetDisplayMode { category, mode } => Arc::new(AppState {
                display_modes: state.display_modes.with(category, mode),
                ..AppState::clone(state)
            }),

            Intent::OpenFilterPanel(active_filter_panel) => Arc::new(AppState {
                active_filter_panel,
                ..AppState::clone(state)
            }),

            Intent::SetSettingsOpen(settings_open) => Arc::new(AppState {
                settings_open,
                ..AppState::clone(state)
            }),
        }
    }

    /// Apply a sequence of intents in order.
    pub fn apply_all(
        &self,
        state: &Arc<AppState>,
        intents: impl IntoIterator<Item = Intent>,
    ) -> Arc<AppState> {
        intents
            .into_iter()
            .fold(Arc::clone(state), |acc, intent| self.apply(&acc, intent))
    }
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
