//! Trophy snapshot types returned by achievement platform sources.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tier of a trophy, from most common to most prestigious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrophyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl TrophyTier {
    /// All tiers, in ascending order of prestige.
    pub const ALL: [TrophyTier; 4] = [
        TrophyTier::Bronze,
        TrophyTier::Silver,
        TrophyTier::Gold,
        TrophyTier::Platinum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrophyTier::Bronze => "bronze",
            TrophyTier::Silver => "silver",
            TrophyTier::Gold => "gold",
            TrophyTier::Platinum => "platinum",
        }
    }
}

impl fmt::Display for TrophyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrophyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Ok(TrophyTier::Bronze),
            "silver" => Ok(TrophyTier::Silver),
            "gold" => Ok(TrophyTier::Gold),
            "platinum" => Ok(TrophyTier::Platinum),
            other => Err(format!("unknown trophy tier: {other}")),
        }
    }
}

/// Rarity classification derived from how many players earned a trophy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrophyRarity {
    UltraRare,
    VeryRare,
    Rare,
    Common,
}

impl TrophyRarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrophyRarity::UltraRare => "ultra rare",
            TrophyRarity::VeryRare => "very rare",
            TrophyRarity::Rare => "rare",
            TrophyRarity::Common => "common",
        }
    }
}

impl fmt::Display for TrophyRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a single trophy within a title's catalog,
/// joined with one user's earned status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrophyRecord {
    /// Identifier of the trophy, stable within a title's catalog.
    pub trophy_id: u32,

    /// Display name of the trophy.
    pub name: String,

    /// Description of how the trophy is earned.
    pub details: Option<String>,

    /// Icon image URL from the catalog.
    pub icon_url: Option<String>,

    /// Tier of the trophy.
    pub tier: TrophyTier,

    /// Rarity classification.
    pub rarity: TrophyRarity,

    /// Whether the user has earned this trophy.
    pub earned: bool,

    /// When the trophy was earned, if it was.
    pub earned_at: Option<DateTime<Utc>>,

    /// Percentage of players who earned the trophy, as reported by the
    /// platform (decimal-as-text, e.g. "42.1").
    pub earned_rate_percent: Option<String>,
}

/// One user's trophy progress for a single title, produced by a trophy
/// source query. Transient: never stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementTitle {
    /// Display name of the game, or `None` when the user has no titles
    /// (or a search found no match).
    pub game_title: Option<String>,

    /// Overall completion percentage for the title, 0-100.
    pub progress_percent: u8,

    /// Trophies for the title, in the order the platform reports them.
    pub trophies: Vec<TrophyRecord>,
}

impl AchievementTitle {
    /// The "user has nothing to report" value. Not an error.
    pub fn empty() -> Self {
        Self {
            game_title: None,
            progress_percent: 0,
            trophies: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trophies.is_empty()
    }
}
