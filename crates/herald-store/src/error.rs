//! Error types for the achievement store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open or initialize the database file.
    #[error("failed to open achievements database at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query or statement failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("database connection is poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
