//! Condition aggregation.
//!
//! Filters reach a list from several independent places. The
//! [`ConditionAggregator`] collects them in a fixed order and merges them
//! into one AND-ed predicate:
//!
//! 1. search-module conditions (free-text and per-column search)
//! 2. developer scopes
//! 3. request parameters naming columns
//! 4. embedding constraints
//! 5. values remembered in the search session
//!
//! Every source contributes [`Predicate`]s, so parameters stay bound no
//! matter where a condition came from.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::types::{Column, Predicate, SearchValue, Value, is_blank};

use super::compiler::{PredicateCompiler, equality_for, param_for};
use super::session::SearchSessionStore;

/// Where a condition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionSource {
    /// Free-text and per-column search.
    Search,
    /// Scopes added by the host.
    Developer,
    /// Request parameters.
    Params,
    /// Embedding constraints.
    Constraints,
    /// Remembered search session values.
    Session,
}

impl fmt::Display for ConditionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionSource::Search => "search",
            ConditionSource::Developer => "developer",
            ConditionSource::Params => "params",
            ConditionSource::Constraints => "constraints",
            ConditionSource::Session => "session",
        };
        f.write_str(s)
    }
}

/// An ordered list of conditions from all sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    entries: Vec<(ConditionSource, Predicate)>,
}

impl ConditionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a condition. Empty predicates are dropped.
    pub fn push(&mut self, source: ConditionSource, predicate: Predicate) {
        if !predicate.is_empty() {
            self.entries.push((source, predicate));
        }
    }

    /// Conditions in order.
    pub fn iter(&self) -> impl Iterator<Item = (ConditionSource, &Predicate)> {
        self.entries.iter().map(|(s, p)| (*s, p))
    }

    /// Conditions from one source.
    pub fn from_source(&self, source: ConditionSource) -> impl Iterator<Item = &Predicate> {
        self.entries
            .iter()
            .filter(move |(s, _)| *s == source)
            .map(|(_, p)| p)
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The AND of all conditions, or `None` for an unrestricted query.
    pub fn to_filter(&self) -> Option<Predicate> {
        Predicate::all(self.entries.iter().map(|(_, p)| p.clone()))
    }
}

fn identifier_regex() -> &'static Regex {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("valid identifier regex")
    })
}

/// Collects conditions for one request.
pub struct ConditionAggregator<'a> {
    compiler: &'a PredicateCompiler,
    columns: &'a [Arc<Column>],
    search: Vec<Predicate>,
    searched_columns: HashSet<String>,
    search_joins: Vec<String>,
    developer: Vec<Predicate>,
    params: Vec<(String, String)>,
    constraints: Vec<(String, Value)>,
    session: Option<&'a dyn SearchSessionStore>,
}

impl<'a> ConditionAggregator<'a> {
    /// Creates an aggregator over the model's columns.
    pub fn new(compiler: &'a PredicateCompiler, columns: &'a [Arc<Column>]) -> Self {
        Self {
            compiler,
            columns,
            search: Vec::new(),
            searched_columns: HashSet::new(),
            search_joins: Vec::new(),
            developer: Vec::new(),
            params: Vec::new(),
            constraints: Vec::new(),
            session: None,
        }
    }

    fn column(&self, name: &str) -> Option<&'a Arc<Column>> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn record_join(&mut self, column: &Column) {
        if let Some(join) = plural_join(column)
            && !self.search_joins.contains(join)
        {
            self.search_joins.push(join.clone());
        }
    }

    /// Free-text search over the named columns. Unknown names are ignored.
    pub fn search_text(&mut self, query: &str, column_names: &[&str]) -> &mut Self {
        let columns: Vec<&'a Arc<Column>> =
            column_names.iter().filter_map(|n| self.column(n)).collect();
        let refs: Vec<&Column> = columns.iter().map(|c| c.as_ref()).collect();

        if let Some(predicate) = self.compiler.compile_text(query, &refs) {
            for column in columns {
                self.record_join(column);
            }
            self.search.push(predicate);
        }
        self
    }

    /// Per-column field search.
    pub fn search_column(&mut self, name: &str, value: &SearchValue) -> &mut Self {
        let Some(column) = self.column(name) else {
            debug!(column = name, "Ignoring search on unknown column");
            return self;
        };
        self.searched_columns.insert(column.name.clone());
        if let Some(predicate) = self.compiler.compile(column, value) {
            self.record_join(column);
            self.search.push(predicate);
        }
        self
    }

    /// Adds an already-compiled search condition.
    pub fn add_search_condition(&mut self, predicate: Predicate) -> &mut Self {
        self.search.push(predicate);
        self
    }

    /// Adds a developer scope.
    pub fn add_scope(&mut self, predicate: Predicate) -> &mut Self {
        self.developer.push(predicate);
        self
    }

    /// Adds request parameters. Only names matching a column are used.
    pub fn with_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds embedding constraints as column-name / value pairs.
    pub fn with_constraints<I, K, V>(&mut self, constraints: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.constraints
            .extend(constraints.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Uses remembered search values from `session`.
    pub fn with_session(&mut self, session: &'a dyn SearchSessionStore) -> &mut Self {
        self.session = Some(session);
        self
    }

    /// Joins needed by search and session conditions on plural
    /// associations, in the order they were first needed.
    pub fn search_joins(&self) -> Vec<String> {
        let mut joins = self.search_joins.clone();
        for (column, _) in self.session_conditions() {
            if let Some(join) = plural_join(column)
                && !joins.contains(join)
            {
                joins.push(join.clone());
            }
        }
        joins
    }

    /// Collects every source's conditions in order.
    pub fn all_conditions(&self) -> ConditionSet {
        let mut set = ConditionSet::new();
        for p in &self.search {
            set.push(ConditionSource::Search, p.clone());
        }
        for p in &self.developer {
            set.push(ConditionSource::Developer, p.clone());
        }
        for p in self.conditions_from_params() {
            set.push(ConditionSource::Params, p);
        }
        for p in self.conditions_from_constraints() {
            set.push(ConditionSource::Constraints, p);
        }
        for p in self.conditions_from_session() {
            set.push(ConditionSource::Session, p);
        }
        debug!(conditions = set.len(), "Aggregated conditions");
        set
    }

    /// The merged filter, or `None` when nothing restricts the rows.
    pub fn filter(&self) -> Option<Predicate> {
        self.all_conditions().to_filter()
    }

    fn conditions_from_params(&self) -> Vec<Predicate> {
        self.params
            .iter()
            .filter(|(_, value)| !is_blank(value))
            .filter_map(|(name, value)| equality_for(self.column(name)?, value))
            .collect()
    }

    fn conditions_from_constraints(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        for (name, value) in &self.constraints {
            let (sql, param) = match self.column(name) {
                Some(column) => {
                    let sql = match &column.association {
                        Some(assoc) if assoc.is_belongs_to() => Some(assoc.foreign_key.as_str()),
                        _ => column.search_sql(),
                    };
                    match sql {
                        Some(sql) => (sql.to_string(), param_for(column, value)),
                        None => {
                            warn!(column = %name, "Skipping constraint on column without search expression");
                            continue;
                        }
                    }
                }
                None if identifier_regex().is_match(name) => (name.clone(), value.into()),
                None => {
                    warn!(column = %name, "Skipping constraint on invalid column name");
                    continue;
                }
            };
            predicates.push(if value.is_null() {
                Predicate::is_null(&sql)
            } else {
                Predicate::eq(&sql, param)
            });
        }
        predicates
    }

    fn conditions_from_session(&self) -> Vec<Predicate> {
        self.session_conditions()
            .into_iter()
            .map(|(_, predicate)| predicate)
            .collect()
    }

    fn session_conditions(&self) -> Vec<(&'a Column, Predicate)> {
        let Some(session) = self.session else {
            return Vec::new();
        };
        self.columns
            .iter()
            .filter(|c| !self.searched_columns.contains(&c.name))
            .filter_map(|column| {
                let value = session.get(&column.name)?;
                let predicate = self.compiler.compile(column, &value)?;
                Some((column.as_ref(), predicate))
            })
            .collect()
    }
}

fn plural_join(column: &Column) -> Option<&String> {
    column
        .association
        .as_ref()
        .filter(|a| a.is_plural())
        .and_then(|a| a.join.as_ref())
}
