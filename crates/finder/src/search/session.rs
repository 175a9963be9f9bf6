//! Persisted search values.
//!
//! A [`SearchSessionStore`] remembers the last value submitted for each
//! column so later requests can keep filtering by it and search forms can
//! repopulate their controls. The store only holds data; writing to it is
//! up to the caller that handles the search form submission.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::types::{RangeBound, SearchValue};

/// Per-column search value storage.
pub trait SearchSessionStore: Send + Sync {
    /// The stored value for a column.
    fn get(&self, column: &str) -> Option<SearchValue>;

    /// Stores a value for a column, replacing any previous one.
    fn put(&self, column: &str, value: SearchValue);

    /// Forgets the value for a column.
    fn remove(&self, column: &str) -> Option<SearchValue>;

    /// Forgets all values.
    fn clear(&self);

    /// The stored comparator and bounds for a range control. All parts are
    /// empty when nothing, or something other than a range, is stored.
    fn range_values(&self, column: &str) -> (Option<String>, RangeBound, RangeBound) {
        match self.get(column) {
            Some(SearchValue::Range(range)) => (range.opt, range.from, range.to),
            _ => (None, RangeBound::Empty, RangeBound::Empty),
        }
    }

    /// The stored plain value or selected id, for repopulating a simple
    /// control. Ranges with a comparator are read with
    /// [`range_values`](Self::range_values) instead.
    fn restored_value(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            SearchValue::Scalar(s) | SearchValue::IdRef(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

/// A [`SearchSessionStore`] held in memory.
///
/// Snapshots serialize to JSON so a host can keep them in whatever session
/// backend it uses between requests.
#[derive(Debug, Default)]
pub struct InMemorySearchSession {
    values: RwLock<HashMap<String, SearchValue>>,
}

impl InMemorySearchSession {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored columns.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Serializes all stored values, keyed by column name.
    pub fn snapshot(&self) -> serde_json::Result<serde_json::Value> {
        let values = self.values.read();
        let ordered: BTreeMap<&String, &SearchValue> = values.iter().collect();
        serde_json::to_value(ordered)
    }

    /// Rebuilds a store from a [`snapshot`](Self::snapshot).
    pub fn restore(snapshot: serde_json::Value) -> serde_json::Result<Self> {
        let values: HashMap<String, SearchValue> = serde_json::from_value(snapshot)?;
        Ok(Self {
            values: RwLock::new(values),
        })
    }
}

impl SearchSessionStore for InMemorySearchSession {
    fn get(&self, column: &str) -> Option<SearchValue> {
        self.values.read().get(column).cloned()
    }

    fn put(&self, column: &str, value: SearchValue) {
        self.values.write().insert(column.to_string(), value);
    }

    fn remove(&self, column: &str) -> Option<SearchValue> {
        self.values.write().remove(column)
    }

    fn clear(&self) {
        self.values.write().clear();
    }
}
