//! String comparator handler.

use crate::types::{Predicate, SearchValue, SqlParam};

/// Comparators accepted by structured string searches, as
/// `(label, template)`. Templates containing `?` are LIKE patterns.
pub const STRING_COMPARATORS: &[(&str, &str)] = &[
    ("contains", "%?%"),
    ("begins_with", "?%"),
    ("ends_with", "%?"),
    ("=", "="),
    ("!=", "!="),
    ("is_between", "BETWEEN"),
];

/// Handles string, text and email columns.
pub struct StringHandler;

impl StringHandler {
    /// Builds SQL for a string column.
    ///
    /// Plain input is a case-insensitive match using `like_pattern`.
    /// Structured input picks a comparator by label or template.
    pub fn build_sql(sql: &str, value: &SearchValue, like_pattern: &str) -> Option<Predicate> {
        let range = match value {
            SearchValue::Range(range) => range,
            SearchValue::Scalar(s) | SearchValue::IdRef(s) => {
                return Some(Self::build_like(sql, s, like_pattern));
            }
            SearchValue::IdList(_) => return None,
        };

        let template = Self::comparator(range.opt.as_deref()?)?;
        let from = range.from.as_text()?;

        match template {
            "BETWEEN" => {
                let to = range.to.as_text()?;
                Some(Predicate::between(sql, SqlParam::text(from), SqlParam::text(to)))
            }
            t if t.contains('?') => Some(Predicate::compare(
                sql,
                "LIKE",
                SqlParam::text(apply_pattern(t, from)),
            )),
            op => Some(Predicate::compare(sql, op, SqlParam::text(from))),
        }
    }

    /// `LOWER(sql) LIKE ?` with `value` lowercased into `pattern`.
    pub fn build_like(sql: &str, value: &str, pattern: &str) -> Predicate {
        Predicate::with_params(
            format!("LOWER({}) LIKE ?", sql),
            vec![SqlParam::text(apply_pattern(pattern, value))],
        )
    }

    fn comparator(opt: &str) -> Option<&'static str> {
        let opt = opt.trim();
        STRING_COMPARATORS
            .iter()
            .find(|(label, template)| *template == opt || label.eq_ignore_ascii_case(opt))
            .map(|(_, template)| *template)
            .or_else(|| opt.eq_ignore_ascii_case("between").then_some("BETWEEN"))
    }
}

/// Substitutes the first `?` in `pattern` with the lowercased value.
pub fn apply_pattern(pattern: &str, value: &str) -> String {
    pattern.replacen('?', &value.to_lowercase(), 1)
}
