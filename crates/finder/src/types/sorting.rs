//! Sort specifications.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::column::{Column, SortKeyFn};
use crate::error::SortError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

impl SortDirection {
    /// The SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    /// Parses `asc`/`desc` (case-insensitive). Anything else is ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One column of a sort specification.
#[derive(Debug, Clone)]
pub struct SortEntry {
    /// The sorted column.
    pub column: Arc<Column>,
    /// The sort direction.
    pub direction: SortDirection,
}

/// An ordered list of sort columns.
///
/// A method-sorted column (one whose key is computed in memory) can only be
/// sorted on alone; construction rejects any multi-column sort that
/// includes one.
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    entries: Vec<SortEntry>,
}

impl SortSpec {
    /// Builds a sort specification from `(column, direction)` pairs.
    pub fn new(
        entries: impl IntoIterator<Item = (Arc<Column>, SortDirection)>,
    ) -> Result<Self, SortError> {
        let entries: Vec<SortEntry> = entries
            .into_iter()
            .map(|(column, direction)| SortEntry { column, direction })
            .collect();

        if entries.iter().any(|e| e.column.name.trim().is_empty()) {
            return Err(SortError::EmptyColumn);
        }
        if entries.len() > 1 && entries.iter().any(|e| e.column.sort.is_method()) {
            return Err(SortError::MultiColumnMethodSort {
                columns: entries.iter().map(|e| e.column.name.clone()).collect(),
            });
        }
        Ok(Self { entries })
    }

    /// Sorts on a single column.
    pub fn single(column: Arc<Column>, direction: SortDirection) -> Self {
        Self {
            entries: vec![SortEntry { column, direction }],
        }
    }

    /// Parses a comma-separated sort parameter such as `-created_at,name`
    /// against the available columns. A leading `-` means descending.
    /// Unknown column names are skipped.
    pub fn parse(s: &str, columns: &[Arc<Column>]) -> Result<Self, SortError> {
        let mut entries = Vec::new();
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (name, direction) = match item.strip_prefix('-') {
                Some(stripped) => (stripped.trim(), SortDirection::Descending),
                None => (item, SortDirection::Ascending),
            };
            if name.is_empty() {
                return Err(SortError::EmptyColumn);
            }
            match columns.iter().find(|c| c.name == name) {
                Some(column) => entries.push((Arc::clone(column), direction)),
                None => tracing::debug!(column = name, "Ignoring sort on unknown column"),
            }
        }
        Self::new(entries)
    }

    /// The sort entries in order.
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    /// Returns true if there are no sort columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if this sort needs in-memory ordering.
    pub fn sorts_by_method(&self) -> bool {
        self.entries.iter().any(|e| e.column.sort.is_method())
    }

    /// The key function and direction of a method sort.
    pub fn method_sort(&self) -> Option<(&SortKeyFn, SortDirection)> {
        self.entries.iter().find_map(|e| match &e.column.sort {
            super::column::ColumnSort::Method(key) => Some((key, e.direction)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnType, Value};

    fn columns() -> Vec<Arc<Column>> {
        vec![
            Arc::new(Column::new("name", ColumnType::String)),
            Arc::new(Column::new("age", ColumnType::Integer)),
            Arc::new(
                Column::virtual_column("score").with_sort_method(|r| r.value("points").clone()),
            ),
        ]
    }

    #[test]
    fn test_parse_sort() {
        let spec = SortSpec::parse("-age, name, bogus", &columns()).unwrap();
        let entries = spec.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].column.name, "age");
        assert_eq!(entries[0].direction, SortDirection::Descending);
        assert_eq!(entries[1].direction, SortDirection::Ascending);
        assert!(!spec.sorts_by_method());
    }

    #[test]
    fn test_single_method_sort() {
        let spec = SortSpec::parse("-score", &columns()).unwrap();
        assert!(spec.sorts_by_method());
        let (key, direction) = spec.method_sort().unwrap();
        assert_eq!(direction, SortDirection::Descending);
        let record = crate::types::Record::new().with("points", 3);
        assert_eq!(key.key(&record), Value::from(3));
    }

    #[test]
    fn test_multi_column_method_sort_rejected() {
        let err = SortSpec::parse("score,name", &columns()).unwrap_err();
        assert_eq!(
            err,
            SortError::MultiColumnMethodSort {
                columns: vec!["score".to_string(), "name".to_string()]
            }
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Descending);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Ascending);
        assert_eq!(SortDirection::parse(""), SortDirection::Ascending);
    }
}
