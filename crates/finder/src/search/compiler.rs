//! Predicate compilation.
//!
//! [`PredicateCompiler`] turns one column plus one submitted value into a
//! parameterized predicate, or into nothing when the value cannot be
//! searched on. Compilation never fails: blank input, unknown comparators
//! and unparsable numbers or dates all mean "this column is not searched".

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::config::FinderConfig;
use crate::types::{Column, Predicate, SearchValue, SqlParam};

use super::handlers::{
    BooleanHandler, CalendarDateHandler, DateHandler, ExactHandler, NumberHandler, SelectHandler,
    StringHandler,
};
use super::registry::{BuiltinHandler, ColumnTypeRegistry, Resolved};

/// Compiles search values into predicates.
#[derive(Debug, Clone)]
pub struct PredicateCompiler {
    registry: Arc<ColumnTypeRegistry>,
    like_pattern: String,
}

impl Default for PredicateCompiler {
    fn default() -> Self {
        Self::new(ColumnTypeRegistry::default())
    }
}

impl PredicateCompiler {
    /// Creates a compiler using the default `%?%` like pattern.
    pub fn new(registry: ColumnTypeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            like_pattern: crate::config::default_like_pattern(),
        }
    }

    /// Creates a compiler using the like pattern from `config`.
    pub fn with_config(registry: ColumnTypeRegistry, config: &FinderConfig) -> Self {
        Self::new(registry).with_like_pattern(config.like_pattern.clone())
    }

    /// Sets the pattern template used for substring matches. The first `?`
    /// is replaced with the lowercased search text.
    pub fn with_like_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.like_pattern = pattern.into();
        self
    }

    /// The like pattern template.
    pub fn like_pattern(&self) -> &str {
        &self.like_pattern
    }

    /// The handler registry.
    pub fn registry(&self) -> &ColumnTypeRegistry {
        &self.registry
    }

    /// Compiles one column's search value.
    pub fn compile(&self, column: &Column, value: &SearchValue) -> Option<Predicate> {
        let Some(sql) = column.search_sql() else {
            debug!(column = %column.name, "Skipping search on column without search expression");
            return None;
        };
        if value.is_blank() {
            return None;
        }

        let resolved = self.registry.resolve(column);
        let predicate = match &resolved {
            Resolved::Custom(handler) => handler(column, value),
            Resolved::Builtin(builtin) => self.build_builtin(*builtin, column, sql, value),
            Resolved::Fallback => self.build_fallback(column, sql, value),
        };

        match &predicate {
            Some(p) => debug!(column = %column.name, handler = ?resolved, sql = %p.sql, "Compiled search predicate"),
            None => debug!(column = %column.name, handler = ?resolved, "Search value produced no predicate"),
        }
        predicate.filter(|p| !p.is_empty())
    }

    fn build_builtin(
        &self,
        builtin: BuiltinHandler,
        column: &Column,
        sql: &str,
        value: &SearchValue,
    ) -> Option<Predicate> {
        match builtin {
            BuiltinHandler::Number => NumberHandler::build_sql(sql, value),
            BuiltinHandler::String => StringHandler::build_sql(sql, value, &self.like_pattern),
            BuiltinHandler::Date => DateHandler::build_sql(sql, value),
            BuiltinHandler::CalendarDate => CalendarDateHandler::build_sql(sql, value),
            BuiltinHandler::Boolean => BooleanHandler::build_sql(sql, value),
            BuiltinHandler::Select => SelectHandler::build_select(sql, value),
            BuiltinHandler::MultiSelect => SelectHandler::build_multi_select(sql, value),
            BuiltinHandler::RecordSelect => SelectHandler::build_record_select(sql, value),
            BuiltinHandler::Exact => ExactHandler::build_sql(column, sql, value),
        }
    }

    fn build_fallback(&self, column: &Column, sql: &str, value: &SearchValue) -> Option<Predicate> {
        match value {
            SearchValue::Scalar(s) if column.is_text() => {
                Some(StringHandler::build_like(sql, s, &self.like_pattern))
            }
            SearchValue::Scalar(s) => Some(Predicate::eq(sql, column.coerce(s))),
            SearchValue::IdRef(_) | SearchValue::IdList(_) => {
                SelectHandler::build_record_select(sql, value)
            }
            SearchValue::Range(_) => None,
        }
    }

    /// Free-text search across several columns.
    ///
    /// Every token must match at least one column: the result is an AND
    /// over tokens of an OR over columns. Textual columns match by
    /// case-insensitive substring, other columns by equality with the token
    /// coerced to the column's type. Columns without a search expression
    /// are ignored.
    pub fn compile_multi_column<S: AsRef<str>>(
        &self,
        tokens: &[S],
        columns: &[&Column],
    ) -> Option<Predicate> {
        let columns: Vec<(&Column, &str)> = columns
            .iter()
            .filter_map(|c| c.search_sql().map(|sql| (*c, sql)))
            .collect();
        if columns.is_empty() {
            return None;
        }

        let per_token = tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.trim().is_empty())
            .filter_map(|token| {
                Predicate::any(columns.iter().map(|(column, sql)| {
                    if column.is_text() {
                        StringHandler::build_like(sql, token, &self.like_pattern)
                    } else {
                        Predicate::eq(sql, column.coerce(token))
                    }
                }))
            });

        let predicate = Predicate::all(per_token);
        if let Some(p) = &predicate {
            debug!(columns = columns.len(), sql = %p.sql, "Compiled multi-column search");
        }
        predicate
    }

    /// Tokenizes `query` and runs [`compile_multi_column`](Self::compile_multi_column).
    pub fn compile_text(&self, query: &str, columns: &[&Column]) -> Option<Predicate> {
        self.compile_multi_column(&tokenize(query), columns)
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r#""([^"]*)"|(\S+)"#).expect("valid token regex"))
}

/// Splits free-text input into search tokens.
///
/// Tokens are separated by whitespace; a double-quoted phrase is kept as a
/// single token without its quotes.
pub fn tokenize(query: &str) -> Vec<String> {
    token_regex()
        .captures_iter(query)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Equality predicate for a column whose value comes from the request or
/// an embedding constraint rather than a search form.
pub(crate) fn equality_for(column: &Column, raw: &str) -> Option<Predicate> {
    let sql = match &column.association {
        Some(assoc) if assoc.is_belongs_to() => assoc.foreign_key.as_str(),
        _ => column.search_sql()?,
    };
    Some(Predicate::eq(sql, column.coerce(raw)))
}

/// Binds a row value as a parameter.
pub(crate) fn param_for(column: &Column, value: &crate::types::Value) -> SqlParam {
    match value {
        crate::types::Value::Text(s) => column.coerce(s),
        other => SqlParam::from(other),
    }
}
