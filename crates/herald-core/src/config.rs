//! Environment-sourced application configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use herald_models::TrophyTier;
use thiserror::Error;

/// Errors raised while loading configuration. All of them are fatal at
/// startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// When to announce a user leaving a voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceLeavePolicy {
    /// Announce every leave.
    EveryLeave,
    /// Announce only the leave that empties the channel.
    #[default]
    LastLeaves,
}

impl FromStr for VoiceLeavePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "every_leave" => Ok(VoiceLeavePolicy::EveryLeave),
            "last_leaves" => Ok(VoiceLeavePolicy::LastLeaves),
            other => Err(format!(
                "unknown voice leave policy: {other} (expected every_leave or last_leaves)"
            )),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct HeraldConfig {
    /// Discord bot token, consumed by the presence-event collaborator.
    pub discord_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// The single chat that receives notifications and may issue commands.
    pub telegram_chat_id: i64,
    /// How long repeated presence events for one user are suppressed.
    pub ignore_duration: Duration,
    /// NPSSO credential per operator-chosen nickname.
    pub psn_tokens: HashMap<String, String>,
    /// How often the achievement scheduler polls.
    pub poll_interval: Duration,
    /// Sent-achievement rows older than this many days are pruned.
    pub retention_days: i64,
    /// Trophy tiers that trigger notifications.
    pub tracked_tiers: Vec<TrophyTier>,
    /// When to announce voice-channel leaves.
    pub voice_leave_policy: VoiceLeavePolicy,
    /// Path of the SQLite deduplication database.
    pub db_path: PathBuf,
}

impl HeraldConfig {
    /// Loads and validates configuration from the environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            discord_token: required("DISCORD_BOT_TOKEN")?,
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: parsed("TELEGRAM_CHAT_ID", required("TELEGRAM_CHAT_ID")?)?,
            ignore_duration: Duration::from_millis(parsed_or(
                "IGNORE_USERS_DURATION_MS",
                300_000,
            )?),
            psn_tokens: parse_psn_tokens(&required("PSN_TOKENS")?)?,
            poll_interval: Duration::from_millis(parsed_or(
                "ACHIEVEMENT_CHECK_INTERVAL_MS",
                300_000,
            )?),
            retention_days: parsed_or("ACHIEVEMENT_RECORD_PRESERVE_DAYS", 7)?,
            tracked_tiers: match std::env::var("TRACK_ACHIEVEMENT_TYPES") {
                Ok(raw) => parse_tiers(&raw)?,
                Err(_) => TrophyTier::ALL.to_vec(),
            },
            voice_leave_policy: match std::env::var("VOICE_LEAVE_POLICY") {
                Ok(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                    var: "VOICE_LEAVE_POLICY",
                    reason,
                })?,
                Err(_) => VoiceLeavePolicy::default(),
            },
            db_path: std::env::var("ACHIEVEMENTS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("achievements.db")),
        })
    }
}

fn required(var: &'static str) -> Result<String> {
    let value = std::env::var(var).map_err(|_| ConfigError::Missing(var))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(var));
    }
    Ok(value)
}

fn parsed<T: FromStr>(var: &'static str, raw: String) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parsed_or<T: FromStr>(var: &'static str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => parsed(var, raw),
        Err(_) => Ok(default),
    }
}

/// Parses the nickname-to-NPSSO credential map from its JSON form,
/// lowercasing nicknames so command arguments match regardless of case.
fn parse_psn_tokens(raw: &str) -> Result<HashMap<String, String>> {
    let parsed: HashMap<String, String> =
        serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
            var: "PSN_TOKENS",
            reason: format!("expected a JSON object of nickname to NPSSO token: {e}"),
        })?;
    if parsed.is_empty() {
        return Err(ConfigError::Invalid {
            var: "PSN_TOKENS",
            reason: "credential map is empty".to_string(),
        });
    }
    Ok(parsed
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect())
}

/// Parses the comma-separated tracked-tier allow-list.
fn parse_tiers(raw: &str) -> Result<Vec<TrophyTier>> {
    let tiers: Vec<TrophyTier> = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse().map_err(|reason| ConfigError::Invalid {
                var: "TRACK_ACHIEVEMENT_TYPES",
                reason,
            })
        })
        .collect::<Result<_>>()?;
    if tiers.is_empty() {
        return Err(ConfigError::Invalid {
            var: "TRACK_ACHIEVEMENT_TYPES",
            reason: "allow-list is empty".to_string(),
        });
    }
    Ok(tiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tiers() {
        let tiers = parse_tiers("gold, platinum").unwrap();
        assert_eq!(tiers, vec![TrophyTier::Gold, TrophyTier::Platinum]);

        assert!(parse_tiers("gold,wood").is_err());
        assert!(parse_tiers("").is_err());
    }

    #[test]
    fn test_parse_psn_tokens() {
        let tokens = parse_psn_tokens(r#"{"Alice": "npsso-a", "bob": "npsso-b"}"#).unwrap();
        assert_eq!(tokens.len(), 2);
        // Nicknames are lowercased for case-insensitive command arguments.
        assert_eq!(tokens.get("alice").map(String::as_str), Some("npsso-a"));

        assert!(parse_psn_tokens("{}").is_err());
        assert!(parse_psn_tokens("not json").is_err());
    }

    #[test]
    fn test_voice_leave_policy_parse() {
        assert_eq!(
            "every_leave".parse::<VoiceLeavePolicy>().unwrap(),
            VoiceLeavePolicy::EveryLeave
        );
        assert_eq!(
            "LAST_LEAVES".parse::<VoiceLeavePolicy>().unwrap(),
            VoiceLeavePolicy::LastLeaves
        );
        assert!("sometimes".parse::<VoiceLeavePolicy>().is_err());
    }
}
