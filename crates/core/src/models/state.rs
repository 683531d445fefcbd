use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::store::RecordStore;
use super::token::{Category, Token, TokenId};

/// Sort order applied to every category view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first
    #[default]
    CreatedAt,
    /// Largest market cap first
    MarketCap,
}

/// Per-column display preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    P1,
    P2,
    P3,
}

/// One display mode per category, chosen independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayModes {
    pub new_pairs: DisplayMode,
    pub final_stretch: DisplayMode,
    pub migrated: DisplayMode,
}

impl DisplayModes {
    pub fn get(&self, category: Category) -> DisplayMode {
        match category {
            Category::NewPairs => self.new_pairs,
            Category::FinalStretch => self.final_stretch,
            Category::Migrated => self.migrated,
        }
    }

    /// Copy with one category's mode replaced.
    #[must_use]
    pub fn with(mut self, category: Category, mode: DisplayMode) -> Self {
        match category {
            Category::NewPairs => self.new_pairs = mode,
            Category::FinalStretch => self.final_stretch = mode,
            Category::Migrated => self.migrated = mode,
        }
        self
    }
}

/// The whole application state.
///
/// Published states are shared behind `Arc` and never mutated; each
/// transition builds a new value.
#[derive(Debug, Clone, Serialize)]
pub struct AppState {
    pub records: RecordStore,
    pub filter: String,
    pub sort_by: SortKey,
    pub is_loading: bool,
    pub selected_id: Option<TokenId>,
    pub settings_open: bool,
    pub display_modes: DisplayModes,
    pub active_filter_panel: Option<Category>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            records: RecordStore::new(),
            filter: String::new(),
            sort_by: SortKey::default(),
            is_loading: true,
            selected_id: None,
            settings_open: false,
            display_modes: DisplayModes::default(),
            active_filter_panel: None,
        }
    }
}

impl AppState {
    /// The initial state: loading, no records, default controls.
    pub fn initial() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The selected record, if the selection resolves to one.
    pub fn selected_token(&self) -> Option<&Arc<Token>> {
        self.selected_id.as_ref().and_then(|id| self.records.get(id))
    }

    pub fn display_mode(&self, category: Category) -> DisplayMode {
        self.display_modes.get(category)
    }
}
