//! Persistent record of an already-notified achievement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row in the `sent_achievements` table.
///
/// The triple `(user_key, trophy_id, game_title)` is unique; re-inserting
/// an existing triple is a silent no-op. Rows are never mutated after
/// creation and are removed in bulk once `sent_at` exceeds the retention
/// horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentAchievement {
    /// Auto-incrementing row id.
    pub id: i64,

    /// Operator-chosen nickname of the tracked user.
    pub user_key: String,

    /// Identifier of the trophy within its title's catalog.
    pub trophy_id: u32,

    /// Display name of the game the trophy belongs to.
    pub game_title: String,

    /// Display name of the trophy.
    pub trophy_name: String,

    /// When the trophy was earned.
    pub earned_at: DateTime<Utc>,

    /// When the notification was delivered. Used solely for retention
    /// pruning.
    pub sent_at: DateTime<Utc>,
}
