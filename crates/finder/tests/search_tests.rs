//! Search condition integration tests.
//!
//! Compiled predicates are executed against an in-memory SQLite table to
//! check that they select the intended rows.

mod common;

use std::sync::Arc;

use serde_json::json;

use scaffold_finder::backends::sqlite::SqliteRowSource;
use scaffold_finder::finder::{FindOptions, PageRetriever, RowQuery, RowSource};
use scaffold_finder::search::{
    ColumnTypeRegistry, ConditionAggregator, ConditionSource, InMemorySearchSession,
    PredicateCompiler, SearchSessionStore,
};
use scaffold_finder::types::{
    Column, ColumnType, Predicate, RangeBound, SearchUi, SearchValue, SqlParam, Value,
};

use common::{column, create_source, ids, insert_person, people_columns, seed_people, tag_person};

fn compiler() -> PredicateCompiler {
    PredicateCompiler::new(ColumnTypeRegistry::new())
}

async fn matching_ids(source: &SqliteRowSource, filter: Option<&Predicate>) -> Vec<i64> {
    let rows = source
        .fetch_all(&RowQuery::new().with_filter(filter).with_order(Some("id")))
        .await
        .unwrap();
    ids(&rows)
}

// ============================================================================
// Blank Input
// ============================================================================

#[test]
fn test_blank_values_produce_no_predicate() {
    let compiler = compiler();
    let columns = people_columns();

    let blanks = [
        ("name", SearchValue::scalar("")),
        ("name", SearchValue::scalar("   ")),
        ("age", SearchValue::range("BETWEEN", "", "")),
        ("age", SearchValue::range(">", " ", "")),
        ("born_on", SearchValue::range("", "", "")),
        ("active", SearchValue::scalar("")),
        ("team", SearchValue::id("")),
        ("tags", SearchValue::ids(["", " "])),
    ];
    for (name, value) in blanks {
        let column = column(&columns, name);
        assert!(
            compiler.compile(&column, &value).is_none(),
            "blank value for {name} compiled to a predicate"
        );
    }
}

#[test]
fn test_unsearchable_column_is_skipped() {
    let compiler = compiler();
    let computed = Column::virtual_column("full_label");
    assert!(compiler.compile(&computed, &SearchValue::scalar("x")).is_none());

    let hidden = Column::new("secret", ColumnType::String).without_search();
    assert!(compiler.compile(&hidden, &SearchValue::scalar("x")).is_none());
}

// ============================================================================
// Typed Predicates
// ============================================================================

#[tokio::test]
async fn test_numeric_between_is_inclusive() {
    let source = create_source();
    for (id, age) in [(1, 9), (2, 10), (3, 15), (4, 20), (5, 21)] {
        insert_person(&source, id, &format!("p{id}"), Some(age), None, None);
    }
    let columns = people_columns();
    let predicate = compiler()
        .compile(&column(&columns, "age"), &SearchValue::range("BETWEEN", "10", "20"))
        .unwrap();

    assert_eq!(predicate.sql, "age BETWEEN ? AND ?");
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![2, 3, 4]);
}

#[tokio::test]
async fn test_numeric_comparators() {
    let source = create_source();
    seed_people(&source, 5);
    let columns = people_columns();
    let age = column(&columns, "age");
    let compiler = compiler();

    let cases = [
        (">", vec![4, 5]),
        (">=", vec![3, 4, 5]),
        ("<", vec![1, 2]),
        ("<=", vec![1, 2, 3]),
        ("=", vec![3]),
        ("!=", vec![1, 2, 4, 5]),
    ];
    for (opt, expected) in cases {
        let predicate = compiler
            .compile(&age, &SearchValue::range(opt, "3", ""))
            .unwrap();
        assert_eq!(matching_ids(&source, Some(&predicate)).await, expected, "{opt}");
    }

    // Unknown comparators and unparsable numbers are not searched
    assert!(compiler.compile(&age, &SearchValue::range("~", "3", "")).is_none());
    assert!(compiler.compile(&age, &SearchValue::range(">", "three", "")).is_none());
}

#[tokio::test]
async fn test_string_search_is_case_insensitive() {
    let source = create_source();
    insert_person(&source, 1, "xABCx", None, None, None);
    insert_person(&source, 2, "abc", None, None, None);
    insert_person(&source, 3, "ab c", None, None, None);
    let columns = people_columns();

    let predicate = compiler()
        .compile(&column(&columns, "name"), &SearchValue::scalar("aBc"))
        .unwrap();

    assert_eq!(predicate.sql, "LOWER(name) LIKE ?");
    assert_eq!(predicate.params, vec![SqlParam::text("%abc%")]);
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![1, 2]);
}

#[tokio::test]
async fn test_string_comparators() {
    let source = create_source();
    insert_person(&source, 1, "anna", None, None, None);
    insert_person(&source, 2, "hannah", None, None, None);
    insert_person(&source, 3, "bob", None, None, None);
    let columns = people_columns();
    let name = column(&columns, "name");
    let compiler = compiler();

    let begins = compiler
        .compile(&name, &SearchValue::range("begins_with", "an", ""))
        .unwrap();
    assert_eq!(matching_ids(&source, Some(&begins)).await, vec![1]);

    let ends = compiler
        .compile(&name, &SearchValue::range("ends_with", "ah", ""))
        .unwrap();
    assert_eq!(matching_ids(&source, Some(&ends)).await, vec![2]);

    let equals = compiler
        .compile(&name, &SearchValue::range("=", "bob", ""))
        .unwrap();
    assert_eq!(matching_ids(&source, Some(&equals)).await, vec![3]);
}

#[tokio::test]
async fn test_custom_like_pattern() {
    let source = create_source();
    insert_person(&source, 1, "marta", None, None, None);
    insert_person(&source, 2, "amar", None, None, None);
    let columns = people_columns();

    let compiler = compiler().with_like_pattern("?%");
    let predicate = compiler
        .compile(&column(&columns, "name"), &SearchValue::scalar("MAR"))
        .unwrap();
    assert_eq!(predicate.params, vec![SqlParam::text("mar%")]);
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![1]);
}

#[tokio::test]
async fn test_date_range_with_only_upper_bound() {
    let source = create_source();
    insert_person(&source, 1, "a", None, Some("2023-12-31"), None);
    insert_person(&source, 2, "b", None, Some("2024-01-31"), None);
    insert_person(&source, 3, "c", None, Some("2024-02-01"), None);
    let columns = people_columns();
    let born_on = column(&columns, "born_on");
    let compiler = compiler();

    let predicate = compiler
        .compile(&born_on, &SearchValue::range("", "", "2024-01-31"))
        .unwrap();
    assert_eq!(predicate.sql, "born_on <= ?");
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![1, 2]);

    let predicate = compiler
        .compile(&born_on, &SearchValue::range("", "2024-01-01", "2024-01-31"))
        .unwrap();
    assert_eq!(predicate.sql, "born_on BETWEEN ? AND ?");
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![2]);

    assert!(compiler.compile(&born_on, &SearchValue::range("", "", "")).is_none());
}

#[test]
fn test_date_parts_from_form_payload() {
    let payload = json!({
        "from": {"year": "2024", "month": "3", "day": "1", "hour": "9", "minute": "30"},
        "to": {"year": "", "month": "", "day": ""}
    });
    let value = SearchValue::from_json(&payload).unwrap();
    let column = Column::new("created_at", ColumnType::Datetime);

    let predicate = compiler().compile(&column, &value).unwrap();
    assert_eq!(predicate.sql, "created_at >= ?");
    assert_eq!(predicate.params, vec![SqlParam::text("2024-03-01 09:30:00")]);
}

#[tokio::test]
async fn test_boolean_search() {
    let source = create_source();
    seed_people(&source, 3);
    source
        .execute_batch("UPDATE people SET active = 0 WHERE id = 2")
        .unwrap();
    let columns = people_columns();
    let active = column(&columns, "active");
    let compiler = compiler();

    let predicate = compiler.compile(&active, &SearchValue::scalar("false")).unwrap();
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![2]);

    let predicate = compiler.compile(&active, &SearchValue::scalar("yes")).unwrap();
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![1, 3]);
}

#[tokio::test]
async fn test_id_list_binds_in_membership() {
    let source = create_source();
    seed_people(&source, 5);
    let compiler = compiler();
    let picker = Column::new("id", ColumnType::Integer).with_search_ui(SearchUi::RecordSelect);

    let predicate = compiler
        .compile(&picker, &SearchValue::ids(["2", "", "4"]))
        .unwrap();
    assert_eq!(predicate.sql, "id IN (?, ?)");
    assert_eq!(
        predicate.params,
        vec![SqlParam::text("2"), SqlParam::text("4")]
    );
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![2, 4]);

    let predicate = compiler.compile(&picker, &SearchValue::id("5")).unwrap();
    assert_eq!(predicate.sql, "id = ?");
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![5]);
}

#[tokio::test]
async fn test_hostile_input_stays_bound() {
    let source = create_source();
    seed_people(&source, 3);
    let columns = people_columns();

    let value = SearchValue::scalar("x'); DROP TABLE people; --");
    let predicate = compiler()
        .compile(&column(&columns, "name"), &value)
        .unwrap();
    assert!(!predicate.sql.contains("DROP"));
    assert!(matching_ids(&source, Some(&predicate)).await.is_empty());
    assert_eq!(matching_ids(&source, None).await, vec![1, 2, 3]);
}

// ============================================================================
// Registry
// ============================================================================

#[tokio::test]
async fn test_column_handler_takes_precedence() {
    let source = create_source();
    seed_people(&source, 4);
    let columns = people_columns();

    let registry = ColumnTypeRegistry::new()
        .with_tag("integer", |_, _| Some(Predicate::new("1 = 0")))
        .with_column("age", |column, value| match value {
            SearchValue::Scalar(s) if s == "even" => Some(Predicate::new(format!(
                "{} % 2 = 0",
                column.search_sql().unwrap_or(&column.name)
            ))),
            _ => None,
        });
    let compiler = PredicateCompiler::new(registry);

    let predicate = compiler
        .compile(&column(&columns, "age"), &SearchValue::scalar("even"))
        .unwrap();
    assert_eq!(matching_ids(&source, Some(&predicate)).await, vec![2, 4]);

    // Other integer columns pick up the tag handler
    let predicate = compiler
        .compile(&column(&columns, "id"), &SearchValue::scalar("1"))
        .unwrap();
    assert!(matching_ids(&source, Some(&predicate)).await.is_empty());
}

#[test]
fn test_unknown_type_uses_fallback() {
    let compiler = compiler();

    let text_like = Column::virtual_column("summary").with_search_sql("summary");
    let predicate = compiler.compile(&text_like, &SearchValue::scalar("Hi")).unwrap();
    assert_eq!(predicate.sql, "LOWER(summary) LIKE ?");

    let custom = Column::new("score", ColumnType::Other("rating".into()));
    let predicate = compiler.compile(&custom, &SearchValue::scalar("4")).unwrap();
    assert_eq!(predicate.sql, "score = ?");
    assert_eq!(predicate.params, vec![SqlParam::text("4")]);
}

// ============================================================================
// Multi-column Text Search
// ============================================================================

#[tokio::test]
async fn test_every_token_must_match_some_column() {
    let notes = SqliteRowSource::in_memory("notes").unwrap();
    notes
        .execute_batch(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, x TEXT, y TEXT);
             INSERT INTO notes VALUES (1, 'a', 'b'), (2, 'a', 'a'), (3, 'b', 'c'), (4, 'ab', '');",
        )
        .unwrap();

    let x = Column::new("x", ColumnType::String);
    let y = Column::new("y", ColumnType::String);
    let predicate = compiler().compile_text("a b", &[&x, &y]).unwrap();

    assert_eq!(
        predicate.sql,
        "((LOWER(x) LIKE ?) OR (LOWER(y) LIKE ?)) AND ((LOWER(x) LIKE ?) OR (LOWER(y) LIKE ?))"
    );
    assert_eq!(matching_ids(&notes, Some(&predicate)).await, vec![1, 4]);
}

#[test]
fn test_quoted_phrase_is_one_token() {
    let x = Column::new("x", ColumnType::String);
    let predicate = compiler().compile_text(r#""new york" city"#, &[&x]).unwrap();
    assert_eq!(
        predicate.params,
        vec![SqlParam::text("%new york%"), SqlParam::text("%city%")]
    );
    assert!(compiler().compile_text("   ", &[&x]).is_none());
}

// ============================================================================
// Condition Aggregation
// ============================================================================

#[tokio::test]
async fn test_conditions_from_every_source_are_anded() {
    let source = create_source();
    insert_person(&source, 1, "ann", Some(30), None, Some(1));
    insert_person(&source, 2, "anton", Some(40), None, Some(1));
    insert_person(&source, 3, "andy", Some(40), None, Some(2));
    insert_person(&source, 4, "bert", Some(40), None, Some(1));

    let columns = people_columns();
    let compiler = compiler();
    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator
        .search_column("name", &SearchValue::scalar("an"))
        .add_scope(Predicate::compare("age", ">=", SqlParam::integer(35)))
        .with_params([("team", "1"), ("unknown", "zzz")]);

    let conditions = aggregator.all_conditions();
    assert_eq!(conditions.from_source(ConditionSource::Search).count(), 1);
    assert_eq!(conditions.from_source(ConditionSource::Developer).count(), 1);
    assert_eq!(conditions.from_source(ConditionSource::Params).count(), 1);

    let filter = aggregator.filter();
    assert_eq!(matching_ids(&source, filter.as_ref()).await, vec![2]);
}

#[tokio::test]
async fn test_constraints_use_foreign_keys_and_null() {
    let source = create_source();
    insert_person(&source, 1, "a", None, None, Some(1));
    insert_person(&source, 2, "b", None, None, None);
    insert_person(&source, 3, "c", None, None, Some(2));

    let columns = people_columns();
    let compiler = compiler();

    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator.with_constraints([("team", Value::Integer(2))]);
    assert_eq!(matching_ids(&source, aggregator.filter().as_ref()).await, vec![3]);

    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator.with_constraints([("team_id", Value::Null)]);
    let filter = aggregator.filter().unwrap();
    assert_eq!(filter.sql, "team_id IS NULL");
    assert_eq!(matching_ids(&source, Some(&filter)).await, vec![2]);

    // Names that are not plain identifiers are never spliced into SQL
    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator.with_constraints([("1=1 OR team_id", Value::Integer(1))]);
    assert!(aggregator.filter().is_none());
}

#[tokio::test]
async fn test_session_values_restore_filter() {
    let source = create_source();
    seed_people(&source, 10);
    let columns = people_columns();
    let compiler = compiler();
    let session = InMemorySearchSession::new();

    let submitted = SearchValue::range("BETWEEN", "3", "5");
    let mut first = ConditionAggregator::new(&compiler, &columns);
    first.search_column("age", &submitted);
    session.put("age", submitted.clone());
    let first_filter = first.filter();

    // A later request without search input falls back to the session
    let mut later = ConditionAggregator::new(&compiler, &columns);
    later.with_session(&session);
    let later_filter = later.filter();

    assert_eq!(first_filter, later_filter);
    assert_eq!(matching_ids(&source, later_filter.as_ref()).await, vec![3, 4, 5]);

    let (opt, from, to) = session.range_values("age");
    assert_eq!(opt.as_deref(), Some("BETWEEN"));
    assert_eq!(from, RangeBound::text("3"));
    assert_eq!(to, RangeBound::text("5"));
}

#[tokio::test]
async fn test_session_snapshot_round_trip() {
    let session = InMemorySearchSession::new();
    session.put("name", SearchValue::scalar("ann"));
    session.put("tags", SearchValue::ids(["1", "2"]));

    let snapshot = session.snapshot().unwrap();
    let restored = InMemorySearchSession::restore(snapshot).unwrap();

    assert_eq!(restored.len(), 2);
    assert_eq!(restored.restored_value("name").as_deref(), Some("ann"));
    assert_eq!(restored.get("tags"), Some(SearchValue::ids(["1", "2"])));
}

#[tokio::test]
async fn test_search_on_plural_association_adds_join() {
    let source = create_source();
    seed_people(&source, 4);
    tag_person(&source, 1, 10);
    tag_person(&source, 1, 11);
    tag_person(&source, 3, 11);

    let columns = people_columns();
    let compiler = compiler();
    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator.search_column("tags", &SearchValue::ids(["10", "11"]));
    assert_eq!(aggregator.search_joins(), [common::TAG_JOIN.to_string()]);

    let options = FindOptions::from_conditions(&aggregator).with_page(1, 10);
    let page = PageRetriever::default()
        .find_page(&source, &options)
        .await
        .unwrap();

    // Person 1 matches through two join rows but is counted and listed once
    assert_eq!(page.total, 2);
    let mut found = ids(&page.items);
    found.sort();
    assert_eq!(found, vec![1, 3]);
}

#[tokio::test]
async fn test_session_value_on_plural_association_adds_join() {
    let source = create_source();
    seed_people(&source, 3);
    tag_person(&source, 2, 10);
    tag_person(&source, 3, 11);

    let session = InMemorySearchSession::new();
    session.put("tags", SearchValue::ids(["10"]));

    let columns = people_columns();
    let compiler = compiler();
    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator.with_session(&session);
    assert_eq!(aggregator.search_joins(), [common::TAG_JOIN.to_string()]);

    let options = FindOptions::from_conditions(&aggregator).with_page(1, 10);
    let page = PageRetriever::default()
        .find_page(&source, &options)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(ids(&page.items), vec![2]);
}

#[test]
fn test_search_ignores_unknown_columns() {
    let columns: Vec<Arc<Column>> = people_columns();
    let compiler = compiler();
    let mut aggregator = ConditionAggregator::new(&compiler, &columns);
    aggregator
        .search_column("nope", &SearchValue::scalar("x"))
        .search_text("y", &["also_nope"]);
    assert!(aggregator.filter().is_none());
}
