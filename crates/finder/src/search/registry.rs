//! Column type registry.
//!
//! The registry decides which compilation rules apply to a column. Hosts
//! register custom handlers for individual column names or for search-UI
//! and type tags; everything else falls through to the built-in handlers.
//!
//! Resolution order for a column:
//!
//! 1. a handler registered for the column name
//! 2. a handler registered for the column's resolved tag (search UI if set,
//!    otherwise the native type)
//! 3. the built-in handler for the resolved tag
//! 4. the fallback: substring match for textual columns, equality otherwise

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{Column, Predicate, SearchValue};

/// A host-supplied predicate compiler.
pub type HandlerFn = Arc<dyn Fn(&Column, &SearchValue) -> Option<Predicate> + Send + Sync>;

/// Built-in handler families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinHandler {
    /// Numeric comparators.
    Number,
    /// String comparators and substring match.
    String,
    /// Date/time ranges from date parts.
    Date,
    /// Numeric comparators over calendar dates.
    CalendarDate,
    /// Boolean equality.
    Boolean,
    /// Single id equality.
    Select,
    /// Id membership.
    MultiSelect,
    /// Id equality or membership.
    RecordSelect,
    /// Unconditional equality.
    Exact,
}

impl BuiltinHandler {
    /// The built-in handler for a search-UI or type tag.
    pub fn for_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "integer" | "decimal" | "float" | "money" | "usa_money" => BuiltinHandler::Number,
            "string" | "text" | "email" => BuiltinHandler::String,
            "date" | "time" | "datetime" | "timestamp" => BuiltinHandler::Date,
            "calendar_date_select" => BuiltinHandler::CalendarDate,
            "boolean" | "checkbox" => BuiltinHandler::Boolean,
            "select" => BuiltinHandler::Select,
            "multi_select" => BuiltinHandler::MultiSelect,
            "record_select" => BuiltinHandler::RecordSelect,
            "exact" => BuiltinHandler::Exact,
            _ => return None,
        })
    }
}

/// How a column's search value gets compiled.
pub enum Resolved<'a> {
    /// A host handler registered for the column name or its tag.
    Custom(&'a HandlerFn),
    /// A built-in handler.
    Builtin(BuiltinHandler),
    /// Substring match or equality, by column type.
    Fallback,
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Custom(_) => f.write_str("Custom"),
            Resolved::Builtin(b) => write!(f, "Builtin({:?})", b),
            Resolved::Fallback => f.write_str("Fallback"),
        }
    }
}

/// Explicit registry of custom predicate handlers.
#[derive(Clone, Default)]
pub struct ColumnTypeRegistry {
    by_column: HashMap<String, HandlerFn>,
    by_tag: HashMap<String, HandlerFn>,
}

impl ColumnTypeRegistry {
    /// Creates an empty registry. Built-in handlers are always available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one column name.
    pub fn register_column<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Column, &SearchValue) -> Option<Predicate> + Send + Sync + 'static,
    {
        self.by_column.insert(name.into(), Arc::new(handler));
    }

    /// Registers a handler for a search-UI or type tag. Overrides the
    /// built-in handler for that tag.
    pub fn register_tag<F>(&mut self, tag: impl Into<String>, handler: F)
    where
        F: Fn(&Column, &SearchValue) -> Option<Predicate> + Send + Sync + 'static,
    {
        self.by_tag.insert(tag.into(), Arc::new(handler));
    }

    /// Builder-style [`register_column`](Self::register_column).
    pub fn with_column<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Column, &SearchValue) -> Option<Predicate> + Send + Sync + 'static,
    {
        self.register_column(name, handler);
        self
    }

    /// Builder-style [`register_tag`](Self::register_tag).
    pub fn with_tag<F>(mut self, tag: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Column, &SearchValue) -> Option<Predicate> + Send + Sync + 'static,
    {
        self.register_tag(tag, handler);
        self
    }

    /// Resolves the handler for a column.
    pub fn resolve(&self, column: &Column) -> Resolved<'_> {
        if let Some(handler) = self.by_column.get(&column.name) {
            return Resolved::Custom(handler);
        }
        let Some(tag) = column.search_tag() else {
            return Resolved::Fallback;
        };
        if let Some(handler) = self.by_tag.get(tag) {
            return Resolved::Custom(handler);
        }
        BuiltinHandler::for_tag(tag)
            .map(Resolved::Builtin)
            .unwrap_or(Resolved::Fallback)
    }

    /// Returns true if no custom handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty() && self.by_tag.is_empty()
    }
}

impl fmt::Debug for ColumnTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut columns: Vec<_> = self.by_column.keys().collect();
        let mut tags: Vec<_> = self.by_tag.keys().collect();
        columns.sort();
        tags.sort();
        f.debug_struct("ColumnTypeRegistry")
            .field("columns", &columns)
            .field("tags", &tags)
            .finish()
    }
}
