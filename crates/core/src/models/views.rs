use serde::Serialize;
use std::sync::Arc;

use super::token::{Category, Token};

/// Filtered, sorted records split into the three dashboard columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorizedViews {
    pub new_pairs: Vec<Arc<Token>>,
    pub final_stretch: Vec<Arc<Token>>,
    pub migrated: Vec<Arc<Token>>,
}

impl CategorizedViews {
    pub fn get(&self, category: Category) -> &[Arc<Token>] {
        match category {
            Category::NewPairs => &self.new_pairs,
            Category::FinalStretch => &self.final_stretch,
            Category::Migrated => &self.migrated,
        }
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> &mut Vec<Arc<Token>> {
        match category {
            Category::NewPairs => &mut self.new_pairs,
            Category::FinalStretch => &mut self.final_stretch,
            Category::Migrated => &mut self.migrated,
        }
    }

    /// `(category, records)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Arc<Token>])> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Number of records across all three columns.
    pub fn total_len(&self) -> usize {
        self.new_pairs.len() + self.final_stretch.len() + self.migrated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}
