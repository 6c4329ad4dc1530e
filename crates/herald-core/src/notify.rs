//! Outbound notification delivery boundary.

use async_trait::async_trait;

/// Formatting applied to a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Markdown,
    Plain,
}

/// Fire-and-forget message delivery to the notification channel.
///
/// Implementations must catch and log their own failures: delivery is never
/// allowed to abort the scheduler or a presence handler, so this trait has
/// no error channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text` to the configured notification channel.
    async fn deliver(&self, text: &str, format: MessageFormat);
}
