//! Error types for the finder engine.
//!
//! Compiling search input never fails: unusable input is treated as "not
//! searched". The errors here cover the remaining failure classes:
//! invalid sort configuration, invalid engine configuration, and failures
//! reported by the row source while executing queries.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all finder operations.
#[derive(Error, Debug)]
pub enum FinderError {
    /// Sort configuration errors
    #[error(transparent)]
    Sort(#[from] SortError),

    /// Row source / query execution errors
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while building a [`SortSpec`](crate::types::SortSpec).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// A method-sorted column was combined with other sort columns.
    #[error(
        "method-based sorting only supports a single column, got {}",
        columns.join(", ")
    )]
    MultiColumnMethodSort { columns: Vec<String> },

    /// An empty column name was given as a sort key.
    #[error("sort column name must not be empty")]
    EmptyColumn,
}

/// Errors originating from a row source.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String, sql: Option<String> },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Errors related to engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration value is out of range or malformed.
    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type for finder operations.
pub type FinderResult<T> = Result<T, FinderError>;

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::QueryError {
            message: e.to_string(),
            sql: None,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for FinderError {
    fn from(e: rusqlite::Error) -> Self {
        FinderError::Backend(e.into())
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for BackendError {
    fn from(e: r2d2::Error) -> Self {
        BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: e.to_string(),
        }
    }
}
