use serde::Serialize;
use std::sync::Arc;

use crate::errors::CoreError;

use super::state::AppState;
use super::token::Token;
use super::views::CategorizedViews;

/// A state together with the views derived from exactly that state.
///
/// This is the unit consumers observe; the two halves are always published
/// together.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub state: Arc<AppState>,
    pub views: Arc<CategorizedViews>,
}

impl Snapshot {
    pub fn selected_token(&self) -> Option<&Arc<Token>> {
        self.state.selected_token()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    /// Pretty-printed JSON of the state and its views (for debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))
    }
}
