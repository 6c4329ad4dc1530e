//! Cumulative voice-session time tracking.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Per-user voice state. `session_start` is `Some` iff the user is
/// currently considered in voice.
#[derive(Debug, Clone, Default)]
struct VoiceEntry {
    session_start: Option<Instant>,
    accumulated: Duration,
    current_channel: Option<String>,
}

impl VoiceEntry {
    fn live_total(&self, now: Instant) -> Duration {
        match self.session_start {
            Some(start) => self.accumulated + (now - start),
            None => self.accumulated,
        }
    }
}

/// Read-only projection of one user's voice activity, for the summary
/// command.
#[derive(Debug, Clone)]
pub struct VoiceSummary {
    pub user_key: String,
    pub total_seconds: u64,
    /// Channel the user is currently in, if any.
    pub current_channel: Option<String>,
}

/// Accumulates each user's total time in voice across possibly-interrupted
/// sessions.
#[derive(Default)]
pub struct VoiceTracker {
    entries: Mutex<HashMap<String, VoiceEntry>>,
}

impl VoiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session. Prior accumulated time is preserved; an already
    /// running session is restarted on the new channel without folding.
    pub fn start_session(&self, user_key: &str, channel_id: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(user_key.to_string()).or_default();
        entry.session_start = Some(Instant::now());
        entry.current_channel = Some(channel_id.to_string());
    }

    /// Closes the active session, folding the elapsed time into the user's
    /// total. No-op when no session is active.
    pub fn end_session(&self, user_key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(user_key) {
            if let Some(start) = entry.session_start.take() {
                entry.accumulated += Instant::now() - start;
                entry.current_channel = None;
            }
        }
    }

    /// Live total for one user, including the in-progress session. Does not
    /// mutate state.
    pub fn total_seconds(&self, user_key: &str) -> u64 {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(user_key)
            .map(|e| e.live_total(Instant::now()).as_secs())
            .unwrap_or(0)
    }

    /// Per-user summaries, sorted by user key. The sanctioned read-only
    /// view for the summary command.
    pub fn summary(&self) -> Vec<VoiceSummary> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let mut out: Vec<VoiceSummary> = entries
            .iter()
            .map(|(user, entry)| VoiceSummary {
                user_key: user.clone(),
                total_seconds: entry.live_total(now).as_secs(),
                current_channel: entry.current_channel.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.user_key.cmp(&b.user_key));
        out
    }

    /// Clears every user's record.
    pub fn reset_all(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
