//! Numeric comparator handler.

use crate::types::{Predicate, RangeValue, SearchValue, SqlParam};

/// Comparators accepted by numeric and calendar searches.
pub const NUMERIC_COMPARATORS: &[&str] = &["=", ">=", "<=", ">", "<", "!=", "BETWEEN"];

/// Normalizes a submitted comparator to one of [`NUMERIC_COMPARATORS`].
pub(crate) fn numeric_comparator(opt: Option<&str>) -> Option<&'static str> {
    let opt = opt?.trim();
    if opt.eq_ignore_ascii_case("between") || opt.eq_ignore_ascii_case("is_between") {
        return Some("BETWEEN");
    }
    NUMERIC_COMPARATORS.iter().copied().find(|c| *c == opt)
}

/// Handles integer, decimal, float and money columns.
pub struct NumberHandler;

impl NumberHandler {
    /// Builds SQL for a `{opt, from, to}` value.
    ///
    /// The comparator must be known and `from` must be a number. `BETWEEN`
    /// also needs a numeric `to` and is inclusive on both ends.
    pub fn build_sql(sql: &str, value: &SearchValue) -> Option<Predicate> {
        let SearchValue::Range(range) = value else {
            return None;
        };
        let opt = numeric_comparator(range.opt.as_deref())?;
        let from = Self::parse_bound(range, true)?;

        if opt == "BETWEEN" {
            let to = Self::parse_bound(range, false)?;
            return Some(Predicate::between(
                sql,
                SqlParam::float(from),
                SqlParam::float(to),
            ));
        }
        Some(Predicate::compare(sql, opt, SqlParam::float(from)))
    }

    fn parse_bound(range: &RangeValue, from: bool) -> Option<f64> {
        let bound = if from { &range.from } else { &range.to };
        bound.as_text()?.trim().parse::<f64>().ok()
    }
}
