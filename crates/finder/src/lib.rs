//! Scaffold Finder
//!
//! Search-condition compilation and paginated retrieval for scaffolded
//! admin list views. Values submitted through a search form are compiled
//! into parameterized SQL predicates according to each column's type,
//! merged with developer, URL, constraint and session conditions, and then
//! used to count and fetch one page of rows from a [`RowSource`].
//!
//! # Features
//!
//! - **Typed predicates**: numeric, string, date, boolean and select
//!   comparisons with every user value bound as a parameter
//! - **Pluggable column types**: override compilation per column or per
//!   column tag through [`ColumnTypeRegistry`]
//! - **Condition merging**: search, developer, URL, constraint and session
//!   conditions combined with `AND`
//! - **Pagination**: total counts with join de-duplication, SQL ordering or
//!   in-memory method sorting, and a raw-SQL variant
//! - **Session persistence**: submitted values survive between requests
//!
//! Enable the reference SQLite row source with the `sqlite` feature (on by
//! default):
//!
//! ```toml
//! [dependencies]
//! scaffold-finder = { version = "0.1", features = ["sqlite"] }
//! ```
//!
//! # Architecture
//!
//! - [`types`] - column metadata, search values, predicates, sorts and pages
//! - [`search`] - predicate compilation and condition aggregation
//! - [`finder`] - page retrieval over a row source
//! - [`backends`] - row source implementations
//! - [`config`] - engine configuration
//! - [`error`] - error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use scaffold_finder::search::{ColumnTypeRegistry, PredicateCompiler};
//! use scaffold_finder::types::{Column, ColumnType, SearchValue};
//!
//! let compiler = PredicateCompiler::new(ColumnTypeRegistry::new());
//! let age = Column::new("age", ColumnType::Integer);
//!
//! let predicate = compiler
//!     .compile(&age, &SearchValue::range("BETWEEN", "10", "20"))
//!     .unwrap();
//! assert_eq!(predicate.sql, "age BETWEEN ? AND ?");
//! assert_eq!(predicate.params.len(), 2);
//!
//! // Blank input never produces a condition
//! assert!(compiler.compile(&age, &SearchValue::range("BETWEEN", "", "")).is_none());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod error;
pub mod finder;
pub mod search;
pub mod types;

// Re-export commonly used types at crate root
pub use config::FinderConfig;
pub use error::{BackendError, ConfigError, FinderError, FinderResult, SortError};
pub use finder::{FindOptions, JoinSpec, PageRetriever, RowQuery, RowSource, SqlTemplate};
pub use search::{
    ColumnTypeRegistry, ConditionAggregator, InMemorySearchSession, PredicateCompiler,
    SearchSessionStore,
};
pub use types::{Column, ColumnType, Page, Predicate, Record, SearchValue, SortSpec, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
