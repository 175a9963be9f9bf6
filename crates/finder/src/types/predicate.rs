//! Parameterized SQL predicates.
//!
//! A [`Predicate`] is a SQL boolean expression template paired with the
//! values bound to its placeholders. Placeholders are anonymous (`?`) and
//! bind positionally, so predicates can be concatenated freely: combining
//! two predicates concatenates their templates and their parameter lists in
//! the same order.
//!
//! User-supplied data only ever travels through [`SqlParam`]s. The template
//! text is produced by the engine from column metadata and a fixed set of
//! operators.

use serde::{Deserialize, Serialize};

use super::record::Value;

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlParam {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Boolean parameter.
    Bool(bool),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: impl Into<String>) -> Self {
        SqlParam::Text(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a float parameter.
    pub fn float(f: f64) -> Self {
        SqlParam::Float(f)
    }
}

impl From<&Value> for SqlParam {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Bool(*b),
            Value::Integer(i) => SqlParam::Integer(*i),
            Value::Float(f) => SqlParam::Float(*f),
            Value::Text(s) => SqlParam::Text(s.clone()),
        }
    }
}

impl From<Value> for SqlParam {
    fn from(value: Value) -> Self {
        SqlParam::from(&value)
    }
}

/// A SQL condition with bound parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Predicate {
    /// The SQL template, using `?` placeholders.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

impl Predicate {
    /// Creates a predicate without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a predicate with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// `<expr> = ?`
    pub fn eq(expr: &str, param: SqlParam) -> Self {
        Self::compare(expr, "=", param)
    }

    /// `<expr> <op> ?` for an operator chosen by the engine.
    pub fn compare(expr: &str, op: &str, param: SqlParam) -> Self {
        Self::with_params(format!("{} {} ?", expr, op), vec![param])
    }

    /// `<expr> BETWEEN ? AND ?` (inclusive on both ends).
    pub fn between(expr: &str, from: SqlParam, to: SqlParam) -> Self {
        Self::with_params(format!("{} BETWEEN ? AND ?", expr), vec![from, to])
    }

    /// `<expr> IN (?, ?, ...)`.
    ///
    /// Returns `None` for an empty list: an empty membership test is "not
    /// searched", never "matches nothing".
    pub fn in_list(expr: &str, params: Vec<SqlParam>) -> Option<Self> {
        if params.is_empty() {
            return None;
        }
        Some(Self::with_params(
            format!("{} IN ({})", expr, placeholders(params.len())),
            params,
        ))
    }

    /// `<expr> IS NULL`.
    pub fn is_null(expr: &str) -> Self {
        Self::new(format!("{} IS NULL", expr))
    }

    /// Combines with another predicate using AND.
    pub fn and(mut self, other: Predicate) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) AND ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Combines with another predicate using OR.
    pub fn or(mut self, other: Predicate) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) OR ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// AND-joins a sequence of predicates into a flat conjunction.
    ///
    /// Empty predicates are skipped and a single remaining predicate is
    /// returned as is. Returns `None` when nothing is left.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::join(predicates, " AND ")
    }

    /// OR-joins a sequence of predicates into a flat disjunction.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Option<Self> {
        Self::join(predicates, " OR ")
    }

    fn join(predicates: impl IntoIterator<Item = Predicate>, separator: &str) -> Option<Self> {
        let mut predicates: Vec<Predicate> =
            predicates.into_iter().filter(|p| !p.is_empty()).collect();
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => {
                let mut parts = Vec::with_capacity(predicates.len());
                let mut params = Vec::new();
                for predicate in predicates {
                    parts.push(format!("({})", predicate.sql));
                    params.extend(predicate.params);
                }
                Some(Self::with_params(parts.join(separator), params))
            }
        }
    }

    /// Returns true if this predicate has no SQL.
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// `n` comma-separated `?` placeholders.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
