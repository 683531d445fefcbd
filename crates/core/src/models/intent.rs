use super::state::{DisplayMode, SortKey};
use super::token::{Category, Token, TokenId};

/// A request to change application state.
///
/// Both the price feed and the display layer produce intents; only
/// `TransitionService` consumes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Replace the whole record collection and finish loading
    BulkLoad(Vec<Token>),
    /// Reprice one record. Ignored if `id` is unknown.
    UpdatePrice {
        id: TokenId,
        price: f64,
        market_cap: f64,
    },
    SetFilter(String),
    SetSort(SortKey),
    /// Select a record, or clear the selection with `None`
    Select(Option<TokenId>),
    SetDisplayMode {
        category: Category,
        mode: DisplayMode,
    },
    /// Open the filter panel for a category, or close it with `None`
    OpenFilterPanel(Option<Category>),
    SetSettingsOpen(bool),
}

impl Intent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::BulkLoad(_) => "bulk_load",
            Intent::UpdatePrice { .. } => "update_price",
            Intent::SetFilter(_) => "set_filter",
            Intent::SetSort(_) => "set_sort",
            Intent::Select(_) => "select",
            Intent::SetDisplayMode { .. } => "set_display_mode",
            Intent::OpenFilterPanel(_) => "open_filter_panel",
            Intent::SetSettingsOpen(_) => "set_settings_open",
        }
    }
}
