//! Error types for the Telegram interface.

use thiserror::Error;

/// Errors that can occur while building or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// A Telegram API request failed.
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    /// The deduplication store could not be opened.
    #[error(transparent)]
    Store(#[from] herald_store::StoreError),

    /// The PSN client could not be constructed.
    #[error(transparent)]
    Psn(#[from] herald_psn::PsnError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
