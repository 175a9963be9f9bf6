//! Page retrieval.
//!
//! - [`RowSource`] - executes planned count and fetch queries
//! - [`PageRetriever`] - counts, orders and paginates
//! - [`JoinSpec`] - joins declared by the host

mod joins;
mod order;
mod retriever;
mod row_source;

pub use joins::{JoinSpec, resolve_joins, without_joined};
pub use order::{build_order_clause, sort_records};
pub use retriever::{FindOptions, PageRetriever, SqlTemplate};
pub use row_source::{RowQuery, RowSource};
