//! Telegram interface for Herald.
//!
//! This crate owns the command surface (`/help`, `/voicesummary`,
//! `/voicereset`, `/trophies`, `/compare`), the authorized-chat gate, and
//! the [`TelegramNotifier`] that delivers scheduler and presence
//! notifications to the single configured chat.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: bot token from @BotFather
//! - `TELEGRAM_CHAT_ID`: the chat that receives notifications and commands
//! - `DISCORD_BOT_TOKEN`: token for the presence-event collaborator
//! - `PSN_TOKENS`: JSON object of nickname to NPSSO token
//!
//! Optional:
//! - `IGNORE_USERS_DURATION_MS`: suppression window (default: 5 minutes)
//! - `ACHIEVEMENT_CHECK_INTERVAL_MS`: poll interval (default: 5 minutes)
//! - `ACHIEVEMENT_RECORD_PRESERVE_DAYS`: retention horizon (default: 7)
//! - `TRACK_ACHIEVEMENT_TYPES`: comma list of tiers (default: all)
//! - `VOICE_LEAVE_POLICY`: `every_leave` or `last_leaves` (default)
//! - `ACHIEVEMENTS_DB_PATH`: SQLite path (default: achievements.db)

pub mod bot;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod state;

pub use bot::HeraldBot;
pub use error::{Result, TelegramError};
pub use notifier::TelegramNotifier;
