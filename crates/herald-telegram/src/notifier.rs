//! Notification delivery to the configured Telegram chat.

use async_trait::async_trait;
use herald_core::{MessageFormat, Notifier};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use tracing::warn;

/// Delivers core notifications to the single configured chat.
///
/// Fire-and-forget: send failures are logged and swallowed here so they can
/// never abort the scheduler or a presence handler.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, text: &str, format: MessageFormat) {
        let mut request = self.bot.send_message(self.chat_id, text);
        if format == MessageFormat::Markdown {
            request = request.parse_mode(ParseMode::Markdown);
        }
        if let Err(e) = request.await {
            warn!(chat_id = %self.chat_id.0, error = %e, "failed to deliver notification");
        }
    }
}
