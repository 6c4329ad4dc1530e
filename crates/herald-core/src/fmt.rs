//! Human-readable formatting helpers shared by the notification and
//! command-rendering paths.

use chrono::{DateTime, Utc};
use herald_models::TrophyTier;

/// Formats a duration in seconds as `"2h 30m 15s"`, omitting zero-valued
/// leading units. Seconds are always shown.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{secs}s"));
    out
}

/// Formats a timestamp for notification messages (UTC, second precision).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Uppercases the first character, for rendering operator nicknames.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Emoji used for a trophy tier in notification messages.
pub fn tier_emoji(tier: TrophyTier) -> &'static str {
    match tier {
        TrophyTier::Bronze => "🥉",
        TrophyTier::Silver => "🥈",
        TrophyTier::Gold => "🥇",
        TrophyTier::Platinum => "🏆",
    }
}
