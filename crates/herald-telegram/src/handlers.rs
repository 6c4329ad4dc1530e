//! Command handlers for the Telegram bot.

use std::sync::Arc;

use herald_core::{format_duration, tier_emoji};
use herald_models::{AchievementTitle, TrophyRecord};
use herald_psn::TrophyComparison;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::state::BotState;

/// Trophies rendered per message, to stay under Telegram's length limit.
const TROPHIES_PER_MESSAGE: usize = 20;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show this help message")]
    Help,

    #[command(description = "Voice activity summary for tracked users")]
    VoiceSummary,

    #[command(description = "Clear all voice activity history")]
    VoiceReset,

    #[command(description = "Earned trophies for a game: /trophies <nickname> <game>")]
    Trophies(String),

    #[command(description = "Diff two users' trophies: /compare <nickname1> <nickname2> <game>")]
    Compare(String),
}

/// Dispatch a parsed command. Commands from any chat other than the
/// configured one are dropped.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    if msg.chat.id != state.chat_id {
        debug!(chat_id = %msg.chat.id, "ignoring command from unauthorized chat");
        return Ok(());
    }
    info!(chat_id = %msg.chat.id, command = ?cmd, "command received");

    match cmd {
        Command::Help => handle_help(bot, state.chat_id).await,
        Command::VoiceSummary => handle_voice_summary(bot, state).await,
        Command::VoiceReset => handle_voice_reset(bot, state).await,
        Command::Trophies(args) => handle_trophies(bot, state, args).await,
        Command::Compare(args) => handle_compare(bot, state, args).await,
    }
}

async fn handle_help(bot: Bot, chat_id: ChatId) -> ResponseResult<()> {
    bot.send_message(chat_id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

async fn handle_voice_summary(bot: Bot, state: Arc<BotState>) -> ResponseResult<()> {
    let summaries = state.voice.summary();

    let mut message = "*Voice Activity Summary*\n\n".to_string();
    if summaries.is_empty() {
        message.push_str("No voice activity recorded.");
    } else {
        for entry in summaries {
            let channel = entry
                .current_channel
                .map(|c| format!(" (in *{c}*)"))
                .unwrap_or_default();
            message.push_str(&format!(
                "👤 *{}*: {}{channel}\n",
                entry.user_key,
                format_duration(entry.total_seconds)
            ));
        }
    }

    send_markdown(&bot, state.chat_id, &message).await
}

async fn handle_voice_reset(bot: Bot, state: Arc<BotState>) -> ResponseResult<()> {
    state.voice.reset_all();
    info!("voice activity history cleared");
    send_markdown(&bot, state.chat_id, "🔁 Voice activity history cleared.").await
}

async fn handle_trophies(bot: Bot, state: Arc<BotState>, args: String) -> ResponseResult<()> {
    let Some((nickname, query)) = split_nickname_and_query(&args) else {
        return send_markdown(
            &bot,
            state.chat_id,
            "❌ Invalid command format. Use: `/trophies nickname game`",
        )
        .await;
    };

    match state.psn.search_trophies(nickname, query).await {
        Ok(title) if title.is_empty() => {
            send_markdown(&bot, state.chat_id, "🏆 No trophies found.").await
        }
        Ok(title) => {
            for message in render_trophies(&title) {
                send_markdown(&bot, state.chat_id, &message).await?;
            }
            Ok(())
        }
        Err(e) => {
            send_markdown(
                &bot,
                state.chat_id,
                &format!("❌ Error fetching trophies: {e}"),
            )
            .await
        }
    }
}

async fn handle_compare(bot: Bot, state: Arc<BotState>, args: String) -> ResponseResult<()> {
    let Some((user_a, user_b, query)) = split_compare_args(&args) else {
        return send_markdown(
            &bot,
            state.chat_id,
            "❌ Invalid command format. Use: `/compare user1 user2 game`",
        )
        .await;
    };

    match state.psn.compare(user_a, user_b, query).await {
        Ok(comparison) => {
            let message = render_comparison(&comparison, user_a, user_b);
            send_markdown(&bot, state.chat_id, &message).await
        }
        Err(e) => {
            send_markdown(
                &bot,
                state.chat_id,
                &format!("❌ Error fetching trophies: {e}"),
            )
            .await
        }
    }
}

async fn send_markdown(bot: &Bot, chat_id: ChatId, text: &str) -> ResponseResult<()> {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

/// Splits `"<nickname> <query...>"`; `None` when either part is missing.
fn split_nickname_and_query(args: &str) -> Option<(&str, &str)> {
    let (nickname, rest) = args.trim().split_once(char::is_whitespace)?;
    let query = rest.trim();
    if query.is_empty() {
        return None;
    }
    Some((nickname, query))
}

/// Splits `"<nickname1> <nickname2> <query...>"`.
fn split_compare_args(args: &str) -> Option<(&str, &str, &str)> {
    let (user_a, rest) = args.trim().split_once(char::is_whitespace)?;
    let (user_b, query) = split_nickname_and_query(rest)?;
    Some((user_a, user_b, query))
}

/// Renders a searched title as one message per 20 trophies.
fn render_trophies(title: &AchievementTitle) -> Vec<String> {
    let header = format!(
        "🏆 *Latest Trophies for: {}. Current progress: {}%*\n",
        title.game_title.as_deref().unwrap_or("Unknown Game Title"),
        title.progress_percent
    );

    title
        .trophies
        .chunks(TROPHIES_PER_MESSAGE)
        .map(|chunk| {
            let mut message = header.clone();
            for trophy in chunk {
                message.push_str(&render_trophy_entry(trophy));
            }
            message
        })
        .collect()
}

fn render_trophy_entry(trophy: &TrophyRecord) -> String {
    let mut entry = format!(
        "{} *{}* ({})\n",
        tier_emoji(trophy.tier),
        trophy.name,
        trophy.tier
    );
    if let Some(details) = &trophy.details {
        entry.push_str(&format!("📜 {details}\n"));
    }
    if let Some(rate) = &trophy.earned_rate_percent {
        entry.push_str(&format!("🌟 Earned Rate: {rate}%\n"));
    }
    if let Some(earned_at) = trophy.earned_at {
        entry.push_str(&format!(
            "⌚ Date UTC: {}\n",
            herald_core::format_timestamp(earned_at)
        ));
    }
    entry.push('\n');
    entry
}

fn render_comparison(comparison: &TrophyComparison, user_a: &str, user_b: &str) -> String {
    let mut message = format!("🏆 *Trophy Comparison for {}*\n\n", comparison.game_title);
    message.push_str(&render_comparison_side(user_a, user_b, &comparison.only_a));
    message.push_str(&render_comparison_side(user_b, user_a, &comparison.only_b));
    message
}

fn render_comparison_side(owner: &str, other: &str, unique: &[TrophyRecord]) -> String {
    if unique.is_empty() {
        return format!("*{owner} has no unique trophies.*\n");
    }
    let mut section = format!("*{owner} has these trophies (not earned by {other}):*\n");
    for trophy in unique {
        section.push_str(&render_trophy_entry(trophy));
    }
    section
}
