//! SQLite row source.
//!
//! Reads rows of one table through an r2d2 pool of rusqlite connections.
//! In-memory databases are handy for tests; file databases run in WAL mode.
//!
//! # Example
//!
//! ```no_run
//! use scaffold_finder::backends::sqlite::SqliteRowSource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SqliteRowSource::in_memory("people")?;
//! source.execute_batch("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)")?;
//! # Ok(())
//! # }
//! ```

mod source;

pub use source::{SqliteRowSource, SqliteRowSourceConfig};
