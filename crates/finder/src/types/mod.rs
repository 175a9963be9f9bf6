//! Core types for the finder engine.
//!
//! - [`Column`] - column metadata declared by the host model
//! - [`SearchValue`] - a value submitted by a search form
//! - [`Predicate`], [`SqlParam`] - parameterized SQL conditions
//! - [`SortSpec`] - ordered sort columns
//! - [`Page`] - one page of results
//! - [`Record`], [`Value`] - rows returned by a row source
//!
//! # Examples
//!
//! ```
//! use scaffold_finder::types::{Column, ColumnType, SearchValue, SortDirection, SortSpec};
//! use std::sync::Arc;
//!
//! let age = Arc::new(Column::new("age", ColumnType::Integer));
//! let value = SearchValue::range("BETWEEN", "10", "20");
//! assert!(!value.is_blank());
//!
//! let sort = SortSpec::single(Arc::clone(&age), SortDirection::Descending);
//! assert!(!sort.sorts_by_method());
//! ```

mod column;
mod pagination;
mod predicate;
mod record;
mod search_value;
mod sorting;

pub use column::{
    Association, AssociationMacro, Column, ColumnSort, ColumnType, SearchUi, SortKeyFn,
    parse_bool,
};
pub use pagination::Page;
pub use predicate::{Predicate, SqlParam, placeholders};
pub use record::{Record, Value};
pub use search_value::{DateParts, RangeBound, RangeValue, SearchValue};
pub use sorting::{SortDirection, SortEntry, SortSpec};

pub(crate) use search_value::is_blank;
