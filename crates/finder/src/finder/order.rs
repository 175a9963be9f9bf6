//! Ordering: SQL ORDER BY clauses and in-memory method sorts.

use crate::types::{Record, SortDirection, SortKeyFn, SortSpec};

/// Builds the ORDER BY expression list for a SQL-sortable spec.
///
/// Columns without a SQL sort expression are skipped. Returns `None` when
/// nothing is left, or when the sort needs to run in memory.
pub fn build_order_clause(sort: Option<&SortSpec>) -> Option<String> {
    let sort = sort?;
    if sort.sorts_by_method() {
        return None;
    }
    let order: Vec<String> = sort
        .entries()
        .iter()
        .filter_map(|entry| {
            entry
                .column
                .sort
                .sql()
                .map(|sql| format!("{} {}", sql, entry.direction.as_sql()))
        })
        .collect();
    if order.is_empty() {
        None
    } else {
        Some(order.join(", "))
    }
}

/// Sorts records by a computed key.
///
/// The sort is stable in both directions: records with equal keys keep
/// their incoming order. A `Null` key sorts as the minimum.
pub fn sort_records(records: Vec<Record>, key: &SortKeyFn, direction: SortDirection) -> Vec<Record> {
    let mut keyed: Vec<_> = records.into_iter().map(|r| (key.key(&r), r)).collect();
    match direction {
        SortDirection::Ascending => keyed.sort_by(|(a, _), (b, _)| a.sort_cmp(b)),
        SortDirection::Descending => keyed.sort_by(|(a, _), (b, _)| b.sort_cmp(a)),
    }
    keyed.into_iter().map(|(_, r)| r).collect()
}
