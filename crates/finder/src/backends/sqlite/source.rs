//! SQLite row source implementation.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::finder::{RowQuery, RowSource};
use crate::types::{Record, SqlParam, Value};

const BACKEND_NAME: &str = "sqlite";

/// Configuration for the SQLite row source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteRowSourceConfig {
    /// Maximum number of connections in the pool. In-memory databases
    /// always use a single connection.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enable foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteRowSourceConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

/// Rows of one SQLite table, served through an r2d2 connection pool.
pub struct SqliteRowSource {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteRowSourceConfig,
    table: String,
    is_memory: bool,
}

impl Debug for SqliteRowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRowSource")
            .field("table", &self.table)
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

impl SqliteRowSource {
    /// Creates a row source over a fresh in-memory database.
    pub fn in_memory(table: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_config(":memory:", table, SqliteRowSourceConfig::default())
    }

    /// Opens or creates a file-based database.
    pub fn open<P: AsRef<Path>>(path: P, table: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_config(path, table, SqliteRowSourceConfig::default())
    }

    /// Creates a row source with custom configuration.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        table: impl Into<String>,
        config: SqliteRowSourceConfig,
    ) -> Result<Self, BackendError> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let foreign_keys = config.enable_foreign_keys;
        let wal = config.enable_wal && !is_memory;
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if foreign_keys {
                conn.execute_batch("PRAGMA foreign_keys = ON")?;
            }
            if wal {
                conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
            }
            Ok(())
        });

        // Every connection to ":memory:" is its own database, so the pool
        // holds exactly one connection that never expires.
        let builder = Pool::builder().connection_timeout(Duration::from_millis(
            config.connection_timeout_ms,
        ));
        let builder = if is_memory {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            builder
                .max_size(config.max_connections)
                .min_idle(Some(config.min_connections))
        };
        let pool = builder.build(manager)?;

        let table = table.into();
        tracing::info!(table = %table, is_memory, "Opened SQLite row source");

        Ok(Self {
            pool,
            config,
            table,
            is_memory,
        })
    }

    /// The table rows are read from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the row source configuration.
    pub fn config(&self) -> &SqliteRowSourceConfig {
        &self.config
    }

    /// Runs a batch of statements, e.g. to create and seed tables.
    pub fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        let conn = self.get_connection()?;
        conn.execute_batch(sql).map_err(|e| query_error(e, sql))
    }

    /// Runs one statement with parameters and returns the affected row count.
    pub fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<usize, BackendError> {
        let conn = self.get_connection()?;
        conn.execute(sql, params_from_iter(params.iter()))
            .map_err(|e| query_error(e, sql))
    }

    fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, BackendError> {
        Ok(self.pool.get()?)
    }

    fn from_clause(&self, query: &RowQuery<'_>) -> (String, Vec<SqlParam>) {
        let mut sql = format!("FROM {}", self.table);
        for join in query.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        let mut params = Vec::new();
        if let Some(filter) = query.filter.filter(|f| !f.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.sql);
            params.extend(filter.params.iter().cloned());
        }
        (sql, params)
    }

    /// Runs `f` on a pooled connection inside tokio's blocking thread pool.
    async fn run_blocking<T, F>(
        &self,
        sql: String,
        params: Vec<SqlParam>,
        f: F,
    ) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str, &[SqlParam]) -> Result<T, BackendError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn, &sql, &params)
        })
        .await
        .map_err(|e| BackendError::Internal {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("blocking query task failed: {}", e),
            source: Some(Box::new(e)),
        })?
    }
}

fn count_rows(conn: &Connection, sql: &str, params: &[SqlParam]) -> Result<u64, BackendError> {
    let count: i64 = conn
        .query_row(sql, params_from_iter(params.iter()), |row| row.get(0))
        .map_err(|e| query_error(e, sql))?;
    Ok(count.max(0) as u64)
}

fn fetch_rows(conn: &Connection, sql: &str, params: &[SqlParam]) -> Result<Vec<Record>, BackendError> {
    let mut stmt = conn.prepare(sql).map_err(|e| query_error(e, sql))?;
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| row_to_record(row, &names))
        .map_err(|e| query_error(e, sql))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| query_error(e, sql))
}

#[async_trait]
impl RowSource for SqliteRowSource {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn count(&self, query: &RowQuery<'_>) -> Result<u64, BackendError> {
        let (from, params) = self.from_clause(query);
        // Joined rows are counted once per base row, matching fetch.
        let sql = if query.joins.is_empty() {
            format!("SELECT COUNT(*) {}", from)
        } else {
            format!(
                "SELECT COUNT(*) FROM (SELECT DISTINCT {}.* {}) AS t",
                self.table, from
            )
        };
        tracing::debug!(sql = %sql, "Counting rows");
        self.run_blocking(sql, params, count_rows).await
    }

    async fn fetch(&self, query: &RowQuery<'_>) -> Result<Vec<Record>, BackendError> {
        let (from, mut params) = self.from_clause(query);
        let distinct = if query.joins.is_empty() { "" } else { "DISTINCT " };
        let mut sql = format!("SELECT {}{}.* {}", distinct, self.table, from);

        if let Some(order) = query.order_by.filter(|o| !o.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        match query.limit {
            Some(limit) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(SqlParam::Integer(to_i64(limit)));
                params.push(SqlParam::Integer(to_i64(query.offset)));
            }
            None if query.offset > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(SqlParam::Integer(to_i64(query.offset)));
            }
            None => {}
        }

        tracing::debug!(sql = %sql, params = params.len(), "Fetching rows");
        self.run_blocking(sql, params, fetch_rows).await
    }

    async fn count_by_sql(&self, sql: &str, params: &[SqlParam]) -> Result<u64, BackendError> {
        self.run_blocking(sql.to_string(), params.to_vec(), count_rows)
            .await
    }

    async fn fetch_by_sql(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<Record>, BackendError> {
        self.run_blocking(sql.to_string(), params.to_vec(), fetch_rows)
            .await
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlParam::Integer(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            SqlParam::Float(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            SqlParam::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            SqlParam::Null => ToSqlOutput::Owned(SqliteValue::Null),
        })
    }
}

fn row_to_record(row: &Row<'_>, names: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (i, name) in names.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Value::Text(String::from_utf8_lossy(t).into_owned())
            }
        };
        record.push(name.as_str(), value);
    }
    Ok(record)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn query_error(e: rusqlite::Error, sql: &str) -> BackendError {
    BackendError::QueryError {
        message: e.to_string(),
        sql: Some(sql.to_string()),
    }
}
