//! Boolean and exact-match handlers.

use crate::types::{Column, Predicate, SearchValue, SqlParam, parse_bool};

/// Handles boolean and checkbox searches.
pub struct BooleanHandler;

impl BooleanHandler {
    /// `sql = ?` with the value coerced to a boolean. Input that is not a
    /// recognizable boolean produces no predicate.
    pub fn build_sql(sql: &str, value: &SearchValue) -> Option<Predicate> {
        let raw = match value {
            SearchValue::Scalar(s) | SearchValue::IdRef(s) => s,
            _ => return None,
        };
        let b = parse_bool(raw)?;
        Some(Predicate::eq(sql, SqlParam::Bool(b)))
    }
}

/// Handles `exact` columns: equality with the submitted value, coerced to
/// the column type.
pub struct ExactHandler;

impl ExactHandler {
    /// Builds `sql = ?` for a scalar or id value.
    pub fn build_sql(column: &Column, sql: &str, value: &SearchValue) -> Option<Predicate> {
        match value {
            SearchValue::Scalar(s) | SearchValue::IdRef(s) => {
                Some(Predicate::eq(sql, column.coerce(s)))
            }
            _ => None,
        }
    }
}
