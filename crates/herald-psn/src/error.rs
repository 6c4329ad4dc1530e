//! Error types for the PSN trophy source.

use thiserror::Error;

/// Errors that can occur while querying the achievement platform.
#[derive(Debug, Error)]
pub enum PsnError {
    /// The remote platform rejected the credential.
    #[error("PSN authentication failed: {0}")]
    Authentication(String),

    /// The supplied nickname has no configured credential.
    #[error("unknown user \"{nickname}\". Please use one of: {}", .known.join(", "))]
    UnknownUser {
        nickname: String,
        known: Vec<String>,
    },

    /// A search was attempted with an empty query.
    #[error("please use at least one symbol for search")]
    EmptyQuery,

    /// A comparison found no earned trophies for one of the users.
    #[error("no earned trophies found for {0}")]
    NoTrophies(String),

    /// A comparison query matched two different titles.
    #[error("users matched different games: \"{a}\" vs \"{b}\"")]
    TitleMismatch { a: String, b: String },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The PSN API answered with a non-success status.
    #[error("PSN API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The PSN API answered with something we could not interpret.
    #[error("unexpected PSN response: {0}")]
    UnexpectedResponse(String),
}

/// Result type for PSN operations.
pub type Result<T> = std::result::Result<T, PsnError>;
