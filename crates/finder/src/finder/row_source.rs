//! Row source trait.
//!
//! A [`RowSource`] executes the count and fetch queries the page retriever
//! plans. The retriever decides what to filter, join and order by; the
//! source knows the table and how to talk to the database.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{Predicate, Record, SqlParam};

/// One planned query against a row source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowQuery<'a> {
    /// Merged filter, or `None` for all rows.
    pub filter: Option<&'a Predicate>,
    /// JOIN clauses, in order.
    pub joins: &'a [String],
    /// ORDER BY expression list, without the keyword.
    pub order_by: Option<&'a str>,
    /// Maximum rows to return; `None` for all.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: u64,
}

impl<'a> RowQuery<'a> {
    /// A query over all rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Option<&'a Predicate>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the joins.
    pub fn with_joins(mut self, joins: &'a [String]) -> Self {
        self.joins = joins;
        self
    }

    /// Sets the order.
    pub fn with_order(mut self, order_by: Option<&'a str>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Sets limit and offset.
    pub fn with_window(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

/// Executes queries planned by the page retriever.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Counts rows matching `query.filter` over `query.joins`. Ordering and
    /// windowing are ignored.
    async fn count(&self, query: &RowQuery<'_>) -> Result<u64, BackendError>;

    /// Fetches rows matching the query, honoring order, limit and offset.
    async fn fetch(&self, query: &RowQuery<'_>) -> Result<Vec<Record>, BackendError>;

    /// Fetches every matching row, ignoring any limit or offset.
    async fn fetch_all(&self, query: &RowQuery<'_>) -> Result<Vec<Record>, BackendError> {
        let unbounded = RowQuery {
            limit: None,
            offset: 0,
            ..*query
        };
        self.fetch(&unbounded).await
    }

    /// Runs a caller-built `SELECT COUNT(*) ...` statement.
    async fn count_by_sql(&self, sql: &str, params: &[SqlParam]) -> Result<u64, BackendError>;

    /// Runs a caller-built `SELECT` statement.
    async fn fetch_by_sql(&self, sql: &str, params: &[SqlParam])
    -> Result<Vec<Record>, BackendError>;
}
