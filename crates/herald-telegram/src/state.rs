//! Shared state for command handlers.

use std::sync::Arc;

use herald_psn::PsnTrophySource;
use herald_runtime::VoiceTracker;
use teloxide::types::ChatId;

/// Everything a command handler needs.
pub struct BotState {
    /// The only chat this deployment serves.
    pub chat_id: ChatId,
    /// Trophy query and comparison backend.
    pub psn: Arc<PsnTrophySource>,
    /// Voice activity read path for `/voicesummary` and `/voicereset`.
    pub voice: Arc<VoiceTracker>,
}
