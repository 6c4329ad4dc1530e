//! Time-windowed per-user notification suppression.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// A blunt per-user debounce: after any notification-worthy presence event,
/// the user is muted for a fixed window. One clock per user, shared across
/// event types.
///
/// Entries are evicted lazily at lookup time; there is no background sweep,
/// so memory is bounded by the number of distinct users ever notified.
pub struct IgnoreList {
    window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl IgnoreList {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the user is currently suppressed. An expired entry is
    /// removed here and reported as not ignored.
    pub fn is_ignored(&self, user_key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(user_key) {
            Some(&until) if Instant::now() < until => true,
            Some(_) => {
                entries.remove(user_key);
                false
            }
            None => false,
        }
    }

    /// Suppresses the user for the configured window, restarting the clock
    /// if one is already running.
    pub fn mark_ignored(&self, user_key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(user_key.to_string(), Instant::now() + self.window);
    }
}
