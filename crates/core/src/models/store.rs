use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

use super::token::{Category, Token, TokenId};

/// The in-memory record collection: an ordered list plus a lookup-by-id
/// projection of it.
///
/// The lookup maps an id to a position in the ordered list, so both views
/// always resolve to the same record. Cloning is cheap (two `Arc` bumps).
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<Vec<Arc<Token>>>,
    index: Arc<HashMap<TokenId, usize>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a bulk load, preserving input order.
    /// If an id appears more than once, only its first record is kept.
    pub fn from_records(tokens: Vec<Token>) -> Self {
        let mut records = Vec::with_capacity(tokens.len());
        let mut index = HashMap::with_capacity(tokens.len());

        for token in tokens {
            if index.contains_key(&token.id) {
                tracing::warn!(id = %token.id, "Duplicate token id in bulk load, keeping first");
                continue;
            }
            index.insert(token.id.clone(), records.len());
            records.push(Arc::new(token));
        }

        Self {
            records: Arc::new(records),
            index: Arc::new(index),
        }
    }

    /// New store with the record `id` repriced. `None` if `id` is absent.
    ///
    /// Membership is unchanged, so the lookup projection is shared with `self`.
    pub fn with_price(&self, id: &TokenId, price: f64, market_cap: f64) -> Option<Self> {
        let &pos = self.index.get(id)?;
        let updated = Arc::new(self.records[pos].with_price(price, market_cap));

        let mut records = self.records.as_ref().clone();
        records[pos] = updated;

        Some(Self {
            records: Arc::new(records),
            index: Arc::clone(&self.index),
        })
    }

    pub fn get(&self, id: &TokenId) -> Option<&Arc<Token>> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &TokenId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Token>> {
        self.records.iter()
    }

    /// The ordered collection. Its `Arc` identity changes on every mutation.
    pub fn records(&self) -> &Arc<Vec<Arc<Token>>> {
        &self.records
    }

    /// Records of one category, in collection order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Arc<Token>> {
        self.records.iter().filter(move |t| t.category == category)
    }

    /// `true` if both stores hold the very same collection instance.
    pub fn same_records(&self, other: &RecordStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl Serialize for RecordStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
