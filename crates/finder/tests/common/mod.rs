//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use scaffold_finder::backends::sqlite::SqliteRowSource;
use scaffold_finder::types::{Association, AssociationMacro, Column, ColumnType, SearchUi, Value};

pub const TAG_JOIN: &str = "INNER JOIN people_tags ON people_tags.person_id = people.id";

/// An in-memory `people` table with teams and a tag join table.
pub fn create_source() -> SqliteRowSource {
    let source = SqliteRowSource::in_memory("people").expect("Failed to create SQLite source");
    source
        .execute_batch(
            "CREATE TABLE teams (id INTEGER PRIMARY KEY, title TEXT NOT NULL);
             CREATE TABLE people (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL,
                 age INTEGER,
                 born_on TEXT,
                 active INTEGER NOT NULL DEFAULT 1,
                 team_id INTEGER REFERENCES teams(id)
             );
             CREATE TABLE people_tags (person_id INTEGER NOT NULL, tag_id INTEGER NOT NULL);
             INSERT INTO teams VALUES (1, 'Red'), (2, 'Blue');",
        )
        .expect("Failed to create schema");
    source
}

/// Inserts a person row.
pub fn insert_person(
    source: &SqliteRowSource,
    id: i64,
    name: &str,
    age: Option<i64>,
    born_on: Option<&str>,
    team_id: Option<i64>,
) {
    use scaffold_finder::types::SqlParam;

    let param = |v: Option<SqlParam>| v.unwrap_or(SqlParam::Null);
    source
        .execute(
            "INSERT INTO people (id, name, age, born_on, team_id) VALUES (?, ?, ?, ?, ?)",
            &[
                SqlParam::Integer(id),
                SqlParam::text(name),
                param(age.map(SqlParam::Integer)),
                param(born_on.map(SqlParam::text)),
                param(team_id.map(SqlParam::Integer)),
            ],
        )
        .expect("Failed to insert person");
}

/// Tags a person.
pub fn tag_person(source: &SqliteRowSource, person_id: i64, tag_id: i64) {
    source
        .execute_batch(&format!(
            "INSERT INTO people_tags VALUES ({}, {})",
            person_id, tag_id
        ))
        .expect("Failed to tag person");
}

/// Inserts `n` people named `person-01` .. with ages 1..=n.
pub fn seed_people(source: &SqliteRowSource, n: i64) {
    for i in 1..=n {
        insert_person(source, i, &format!("person-{:02}", i), Some(i), None, None);
    }
}

/// Column metadata for the `people` table.
pub fn people_columns() -> Vec<Arc<Column>> {
    vec![
        Arc::new(Column::new("id", ColumnType::Integer)),
        Arc::new(Column::new("name", ColumnType::String)),
        Arc::new(Column::new("age", ColumnType::Integer)),
        Arc::new(Column::new("born_on", ColumnType::Date)),
        Arc::new(Column::new("active", ColumnType::Boolean)),
        Arc::new(Column::association(
            "team",
            Association::new(AssociationMacro::BelongsTo, "teams", "team_id"),
        )),
        Arc::new(
            Column::association(
                "tags",
                Association::new(AssociationMacro::HasAndBelongsToMany, "tags", "person_id")
                    .with_join(TAG_JOIN),
            )
            .with_search_sql("people_tags.tag_id")
            .with_search_ui(SearchUi::MultiSelect),
        ),
    ]
}

/// Looks up a column by name.
pub fn column(columns: &[Arc<Column>], name: &str) -> Arc<Column> {
    columns
        .iter()
        .find(|c| c.name == name)
        .cloned()
        .unwrap_or_else(|| panic!("no column named {name}"))
}

/// The ids of the given rows, in order.
pub fn ids(rows: &[scaffold_finder::types::Record]) -> Vec<i64> {
    rows.iter()
        .map(|r| match r.value("id") {
            Value::Integer(i) => *i,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}
