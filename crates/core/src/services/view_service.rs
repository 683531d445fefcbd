use std::sync::Arc;

use crate::models::state::{AppState, SortKey};
use crate::models::store::RecordStore;
use crate::models::token::Token;
use crate::models::views::CategorizedViews;

/// Inputs the cached views were computed from.
#[derive(Debug)]
struct ViewCacheEntry {
    records: RecordStore,
    filter: String,
    sort_by: SortKey,
    views: Arc<CategorizedViews>,
}

impl ViewCacheEntry {
    fn matches(&self, records: &RecordStore, filter: &str, sort_by: SortKey) -> bool {
        self.records.same_records(records) && self.filter == filter && self.sort_by == sort_by
    }
}

/// Derives the per-category views shown by the dashboard.
///
/// `derive` memoizes on (record collection identity, filter text, sort key):
/// unchanged inputs return the very same `Arc`, so consumers can skip work
/// with a pointer comparison.
#[derive(Debug, Default)]
pub struct ViewService {
    cache: Option<ViewCacheEntry>,
    recomputations: u64,
}

impl ViewService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Views for `state`, recomputed only if its view inputs changed.
    pub fn derive_for(&mut self, state: &AppState) -> Arc<CategorizedViews> {
        self.derive(&state.records, &state.filter, state.sort_by)
    }

    pub fn derive(
        &mut self,
        records: &RecordStore,
        filter: &str,
        sort_by: SortKey,
    ) -> Arc<CategorizedViews> {
        if let Some(entry) = &self.cache {
            if entry.matches(records, filter, sort_by) {
                return Arc::clone(&entry.views);
            }
        }

        let views = Arc::new(Self::compute(records, filter, sort_by));
        self.recomputations += 1;
        self.cache = Some(ViewCacheEntry {
            records: records.clone(),
            filter: filter.to_string(),
            sort_by,
            views: Arc::clone(&views),
        });
        views
    }

    /// Number of times `derive` actually recomputed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Drop the cached views; the next `derive` recomputes.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Uncached filter → sort → partition.
    pub fn compute(records: &RecordStore, filter: &str, sort_by: SortKey) -> CategorizedViews {
        let mut working: Vec<&Arc<Token>> = if filter.is_empty() {
            records.iter().collect()
        } else {
            let needle = filter.to_lowercase();
            records
                .iter()
                .filter(|t| t.matches_lowercase(&needle))
                .collect()
        };

        // `sort_by` is stable: equal keys keep collection order.
        match sort_by {
            SortKey::CreatedAt => working.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::MarketCap => working.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap)),
        }

        let mut views = CategorizedViews::default();
        for token in working {
            views.get_mut(token.category).push(Arc::clone(token));
        }
        views
    }
}
