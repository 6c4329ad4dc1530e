//! Core data models for Herald.
//!
//! These types are the shared vocabulary between the trophy sources, the
//! deduplication store, the scheduler, and the Telegram surface. Trophy
//! snapshots are transient: only the identifying tuple of a sent
//! notification is ever persisted (see [`SentAchievement`]).

pub mod sent;
pub mod trophy;

pub use sent::SentAchievement;
pub use trophy::{AchievementTitle, TrophyRarity, TrophyRecord, TrophyTier};
