//! Durable deduplication and retention store for sent achievements.
//!
//! Backed by a single SQLite table with a `UNIQUE(user_key, trophy_id,
//! game_title)` constraint. The store guarantees at-most-once notification
//! per achievement: inserts of an existing triple are silent no-ops, and
//! existence checks fail closed (an error is propagated, never treated as
//! "not sent").

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::SentAchievementStore;
