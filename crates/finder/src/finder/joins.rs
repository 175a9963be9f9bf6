//! Join resolution.

use serde::{Deserialize, Serialize};

/// Joins declared by the host for a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinSpec {
    /// A complete JOIN clause. It replaces everything else, including joins
    /// required by search conditions, so it must already contain them.
    Raw(String),
    /// JOIN clauses extended with the joins search conditions require.
    List(Vec<String>),
}

impl Default for JoinSpec {
    fn default() -> Self {
        JoinSpec::List(Vec::new())
    }
}

/// The joins for a query: the declared joins plus any search joins,
/// without duplicates, in first-seen order.
pub fn resolve_joins(spec: &JoinSpec, search_joins: &[String]) -> Vec<String> {
    let candidates: Vec<&String> = match spec {
        JoinSpec::Raw(raw) if raw.trim().is_empty() => Vec::new(),
        JoinSpec::Raw(raw) => vec![raw],
        JoinSpec::List(list) => list.iter().chain(search_joins).collect(),
    };
    let mut joins: Vec<String> = Vec::with_capacity(candidates.len());
    for join in candidates {
        let join = join.trim();
        if !join.is_empty() && !joins.iter().any(|j| j == join) {
            joins.push(join.to_string());
        }
    }
    joins
}

/// Drops includes already covered by `joins`, so the same table is never
/// joined twice.
pub fn without_joined(includes: &[String], joins: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for include in includes {
        let include = include.trim();
        if include.is_empty()
            || joins.iter().any(|j| j == include)
            || kept.iter().any(|k| k == include)
        {
            continue;
        }
        kept.push(include.to_string());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_list_is_extended_with_search_joins() {
        let spec = JoinSpec::List(s(&["JOIN a ON a.id = t.a_id"]));
        let joins = resolve_joins(&spec, &s(&["JOIN b ON b.t_id = t.id", "JOIN a ON a.id = t.a_id"]));
        assert_eq!(joins, s(&["JOIN a ON a.id = t.a_id", "JOIN b ON b.t_id = t.id"]));
    }

    #[test]
    fn test_raw_replaces_everything() {
        let spec = JoinSpec::Raw("JOIN x ON x.id = t.x_id".into());
        let joins = resolve_joins(&spec, &s(&["JOIN b ON b.t_id = t.id"]));
        assert_eq!(joins, s(&["JOIN x ON x.id = t.x_id"]));
    }

    #[test]
    fn test_without_joined() {
        let joins = s(&["JOIN a ON a.id = t.a_id"]);
        let includes = s(&["JOIN a ON a.id = t.a_id", "LEFT JOIN c ON c.id = t.c_id", ""]);
        assert_eq!(
            without_joined(&includes, &joins),
            s(&["LEFT JOIN c ON c.id = t.c_id"])
        );
    }
}
