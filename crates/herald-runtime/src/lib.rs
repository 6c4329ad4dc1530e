//! Achievement scheduler and transient presence state for Herald.
//!
//! The scheduler drives the polling pipeline: trophy sources, the same-day
//! and tier filters, the deduplication store, notification delivery, and
//! retention pruning. The presence side tracks the per-user suppression
//! window and cumulative voice-session time, both in-memory and owned by
//! explicitly constructed component instances.

pub mod ignore;
pub mod presence;
pub mod scheduler;
pub mod voice;

pub use ignore::IgnoreList;
pub use presence::{PresenceHandler, VoiceStateChange};
pub use scheduler::{AchievementScheduler, SchedulerConfig};
pub use voice::{VoiceSummary, VoiceTracker};
