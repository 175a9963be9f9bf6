//! Paginated retrieval.
//!
//! [`PageRetriever`] runs one authoritative count and then fetches a single
//! page. SQL-sortable pages are fetched with LIMIT/OFFSET. Method-sorted
//! pages need the whole filtered set: every matching row is fetched, keyed,
//! sorted in memory and sliced, so their cost grows with the number of
//! matching rows rather than with the page size.

use tracing::{debug, warn};

use crate::config::FinderConfig;
use crate::error::FinderResult;
use crate::search::ConditionAggregator;
use crate::types::{Page, Predicate, Record, SortSpec, SqlParam};

use super::joins::{JoinSpec, resolve_joins, without_joined};
use super::order::{build_order_clause, sort_records};
use super::row_source::{RowQuery, RowSource};

/// Options for one page request.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Merged filter, or `None` for all rows.
    pub filter: Option<Predicate>,
    /// Joins declared by the host.
    pub joins: JoinSpec,
    /// Joins required by search conditions on plural associations.
    pub search_joins: Vec<String>,
    /// Joins used to eager-load associations on fetched rows.
    pub eager: Vec<String>,
    /// Joins the count query needs. Defaults to `eager`.
    pub count_includes: Option<Vec<String>>,
    /// Sort order.
    pub sort: Option<SortSpec>,
    /// 1-based page number. Values below 1 mean the first page.
    pub page: u32,
    /// Page size. Defaults to [`FinderConfig::default_per_page`].
    pub per_page: Option<u32>,
}

impl FindOptions {
    /// Options with no filter, returning the first page.
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    /// Takes the filter and search joins from an aggregator.
    pub fn from_conditions(aggregator: &ConditionAggregator<'_>) -> Self {
        Self {
            filter: aggregator.filter(),
            search_joins: aggregator.search_joins(),
            ..Self::new()
        }
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Option<Predicate>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the declared joins.
    pub fn with_joins(mut self, joins: JoinSpec) -> Self {
        self.joins = joins;
        self
    }

    /// Sets eager-load joins.
    pub fn with_eager(mut self, eager: Vec<String>) -> Self {
        self.eager = eager;
        self
    }

    /// Sets the joins used by the count query.
    pub fn with_count_includes(mut self, includes: Vec<String>) -> Self {
        self.count_includes = Some(includes);
        self
    }

    /// Sets the sort.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the page number and size.
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = Some(per_page);
        self
    }
}

/// Caller-supplied SQL pieces for row sources that cannot be described by
/// a filter and joins. Pieces are given without their keywords.
#[derive(Debug, Clone, Default)]
pub struct SqlTemplate {
    /// Select list, e.g. `people.*, COUNT(pets.id) AS pet_count`.
    pub select: String,
    /// Table expression including joins, e.g. `people LEFT JOIN pets ON ...`.
    pub from: String,
    /// Base WHERE condition.
    pub where_clause: Option<String>,
    /// Parameters for `where_clause` placeholders.
    pub params: Vec<SqlParam>,
    /// GROUP BY expression list.
    pub group_by: Option<String>,
    /// ORDER BY expression list, used when the request has no sort.
    pub order_by: Option<String>,
}

impl SqlTemplate {
    /// Creates a template selecting `select` from `from`.
    pub fn new(select: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            from: from.into(),
            ..Default::default()
        }
    }

    /// Sets the base WHERE condition.
    pub fn with_where(mut self, clause: impl Into<String>, params: Vec<SqlParam>) -> Self {
        self.where_clause = Some(clause.into());
        self.params = params;
        self
    }

    /// Sets the GROUP BY list.
    pub fn with_group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    /// Sets the default ORDER BY list.
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref().filter(|g| !g.trim().is_empty())
    }
}

/// Executes page requests against a [`RowSource`].
#[derive(Debug, Clone, Default)]
pub struct PageRetriever {
    config: FinderConfig,
}

impl PageRetriever {
    /// Creates a retriever.
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    fn window(&self, options: &FindOptions) -> (u32, u32, u64) {
        let page = options.page.max(1);
        let per_page = options
            .per_page
            .filter(|p| *p > 0)
            .unwrap_or(self.config.default_per_page)
            .max(1);
        let offset = u64::from(page - 1) * u64::from(per_page);
        (page, per_page, offset)
    }

    /// Finds one page of rows.
    pub async fn find_page<S>(&self, source: &S, options: &FindOptions) -> FinderResult<Page<Record>>
    where
        S: RowSource + ?Sized,
    {
        let (page, per_page, offset) = self.window(options);
        let filter = options.filter.as_ref().filter(|f| !f.is_empty());

        let joins = resolve_joins(&options.joins, &options.search_joins);
        let count_includes =
            without_joined(options.count_includes.as_ref().unwrap_or(&options.eager), &joins);
        let eager = without_joined(&options.eager, &joins);

        let count_joins: Vec<String> = joins.iter().chain(&count_includes).cloned().collect();
        let fetch_joins: Vec<String> = joins.iter().chain(&eager).cloned().collect();

        let total = source
            .count(&RowQuery::new().with_filter(filter).with_joins(&count_joins))
            .await?;
        debug!(source = source.name(), total, page, per_page, "Counted matching rows");

        let query = RowQuery::new().with_filter(filter).with_joins(&fetch_joins);
        let items = match options.sort.as_ref().and_then(SortSpec::method_sort) {
            Some((key, direction)) => {
                let rows = source.fetch_all(&query).await?;
                self.warn_if_large(source.name(), rows.len());
                sort_records(rows, key, direction)
                    .into_iter()
                    .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                    .take(per_page as usize)
                    .collect()
            }
            None => {
                let order = build_order_clause(options.sort.as_ref());
                source
                    .fetch(
                        &query
                            .with_order(order.as_deref())
                            .with_window(u64::from(per_page), offset),
                    )
                    .await?
            }
        };

        Ok(Page::new(total, items, page, per_page))
    }

    /// Finds one page of rows using caller-supplied SQL.
    ///
    /// The filter is AND-ed onto the template's WHERE condition. Grouped
    /// templates are counted through a subquery so each group counts once.
    pub async fn find_page_by_sql<S>(
        &self,
        source: &S,
        template: &SqlTemplate,
        options: &FindOptions,
    ) -> FinderResult<Page<Record>>
    where
        S: RowSource + ?Sized,
    {
        let (page, per_page, offset) = self.window(options);

        let base = template
            .where_clause
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .map(|w| Predicate::with_params(w, template.params.clone()));
        let condition = Predicate::all(base.into_iter().chain(options.filter.clone()));
        let (where_sql, params) = match &condition {
            Some(c) => (format!(" WHERE {}", c.sql), c.params.clone()),
            None => (String::new(), Vec::new()),
        };
        let group_sql = template
            .group_by()
            .map(|g| format!(" GROUP BY {}", g))
            .unwrap_or_default();

        let count_sql = if template.group_by().is_some() {
            format!(
                "SELECT COUNT(*) FROM (SELECT 1 FROM {}{}{}) AS t",
                template.from, where_sql, group_sql
            )
        } else {
            format!("SELECT COUNT(*) FROM {}{}", template.from, where_sql)
        };
        debug!(sql = %count_sql, "Counting by SQL");
        let total = source.count_by_sql(&count_sql, &params).await?;

        let body = format!(
            "SELECT {} FROM {}{}{}",
            template.select, template.from, where_sql, group_sql
        );

        let template_order = template.order_by.as_deref().filter(|o| !o.trim().is_empty());

        let items = match options.sort.as_ref().and_then(SortSpec::method_sort) {
            Some((key, direction)) => {
                // The template order decides how rows with equal keys come out.
                let mut sql = body;
                if let Some(order) = template_order {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(order);
                }
                let rows = source.fetch_by_sql(&sql, &params).await?;
                self.warn_if_large(source.name(), rows.len());
                sort_records(rows, key, direction)
                    .into_iter()
                    .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                    .take(per_page as usize)
                    .collect()
            }
            None => {
                let order = build_order_clause(options.sort.as_ref())
                    .or_else(|| template_order.map(str::to_string));
                let mut sql = body;
                if let Some(order) = order {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(&order);
                }
                sql.push_str(" LIMIT ? OFFSET ?");

                let mut params = params;
                params.push(SqlParam::Integer(i64::from(per_page)));
                params.push(SqlParam::Integer(offset.try_into().unwrap_or(i64::MAX)));
                debug!(sql = %sql, "Fetching page by SQL");
                source.fetch_by_sql(&sql, &params).await?
            }
        };

        Ok(Page::new(total, items, page, per_page))
    }

    fn warn_if_large(&self, source: &str, rows: usize) {
        if rows > self.config.method_sort_warn_rows {
            warn!(
                source,
                rows,
                threshold = self.config.method_sort_warn_rows,
                "Method-based sort materialized a large result set"
            );
        }
    }
}
