//! Presence event handlers: the inbound boundary the chat-platform
//! collaborator invokes.

use std::sync::Arc;

use chrono::Utc;
use herald_core::{format_timestamp, MessageFormat, Notifier, VoiceLeavePolicy};
use tracing::debug;

use crate::ignore::IgnoreList;
use crate::voice::VoiceTracker;

/// A voice-state transition reported by the chat platform.
#[derive(Debug, Clone)]
pub struct VoiceStateChange {
    pub user_key: String,
    pub display_name: String,
    pub guild_name: String,
    /// Channel the user was in before the change, if any.
    pub old_channel: Option<String>,
    /// Channel the user is in after the change, if any.
    pub new_channel: Option<String>,
    /// Members remaining in the channel that was left. Drives the
    /// last-member-leaves announcement policy.
    pub channel_member_count: usize,
}

/// Handles member-join and voice-state events.
///
/// Events for a suppressed user are dropped at the door: no notification
/// and no voice-tracker update. One suppression clock per user, shared
/// across event types.
pub struct PresenceHandler {
    ignores: Arc<IgnoreList>,
    voice: Arc<VoiceTracker>,
    notifier: Arc<dyn Notifier>,
    leave_policy: VoiceLeavePolicy,
}

impl PresenceHandler {
    pub fn new(
        ignores: Arc<IgnoreList>,
        voice: Arc<VoiceTracker>,
        notifier: Arc<dyn Notifier>,
        leave_policy: VoiceLeavePolicy,
    ) -> Self {
        Self {
            ignores,
            voice,
            notifier,
            leave_policy,
        }
    }

    /// A new member joined the community.
    pub async fn member_joined(&self, user_key: &str, display_tag: &str) {
        if self.ignores.is_ignored(user_key) {
            debug!(user = %user_key, "join notification suppressed");
            return;
        }

        let message = format!(
            "*New user joined!*\n👤 *Tag*: {display_tag}\n🆔 *ID*: {user_key}\n📅 *Joined*: {}",
            format_timestamp(Utc::now())
        );
        self.notifier.deliver(&message, MessageFormat::Markdown).await;
        self.ignores.mark_ignored(user_key);
    }

    /// A user's voice state changed. Suppressed users' events are dropped
    /// entirely; in particular, no session time accrues for them.
    pub async fn voice_state_changed(&self, event: VoiceStateChange) {
        if self.ignores.is_ignored(&event.user_key) {
            debug!(user = %event.user_key, "voice event suppressed");
            return;
        }

        match (&event.old_channel, &event.new_channel) {
            (None, Some(channel)) => {
                self.voice.start_session(&event.user_key, channel);
                self.notify_voice(
                    &event,
                    format!(
                        "*{}* joined voice channel *{channel}* in *{}*!",
                        event.display_name, event.guild_name
                    ),
                )
                .await;
            }
            (Some(channel), None) => {
                self.voice.end_session(&event.user_key);

                let announce = match self.leave_policy {
                    VoiceLeavePolicy::EveryLeave => true,
                    VoiceLeavePolicy::LastLeaves => event.channel_member_count == 0,
                };
                if announce {
                    self.notify_voice(
                        &event,
                        format!(
                            "*{}* left voice channel *{channel}* in *{}*!",
                            event.display_name, event.guild_name
                        ),
                    )
                    .await;
                }
            }
            (Some(_), Some(new_channel)) => {
                // Channel-to-channel move: fold the finished leg into the
                // total and restart on the new channel, silently.
                self.voice.end_session(&event.user_key);
                self.voice.start_session(&event.user_key, new_channel);
            }
            (None, None) => {}
        }
    }

    async fn notify_voice(&self, event: &VoiceStateChange, message: String) {
        self.notifier.deliver(&message, MessageFormat::Markdown).await;
        self.ignores.mark_ignored(&event.user_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }

        fn last(&self) -> Option<String> {
            self.messages.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, text: &str, _format: MessageFormat) {
            self.messages.lock().unwrap().push(text.to_string());
        }
    }

    fn handler(policy: VoiceLeavePolicy) -> (PresenceHandler, Arc<RecordingNotifier>, Arc<VoiceTracker>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let voice = Arc::new(VoiceTracker::new());
        let handler = PresenceHandler::new(
            Arc::new(IgnoreList::new(Duration::from_secs(300))),
            Arc::clone(&voice),
            notifier.clone() as Arc<dyn Notifier>,
            policy,
        );
        (handler, notifier, voice)
    }

    fn join(user: &str, channel: &str) -> VoiceStateChange {
        VoiceStateChange {
            user_key: user.to_string(),
            display_name: user.to_string(),
            guild_name: "Guild".to_string(),
            old_channel: None,
            new_channel: Some(channel.to_string()),
            channel_member_count: 1,
        }
    }

    fn leave(user: &str, channel: &str, remaining: usize) -> VoiceStateChange {
        VoiceStateChange {
            user_key: user.to_string(),
            display_name: user.to_string(),
            guild_name: "Guild".to_string(),
            old_channel: Some(channel.to_string()),
            new_channel: None,
            channel_member_count: remaining,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_join_is_suppressed() {
        let (handler, notifier, _) = handler(VoiceLeavePolicy::EveryLeave);

        handler.member_joined("alice", "alice#1234").await;
        assert_eq!(notifier.count(), 1);

        // Within the window the second event is dropped.
        handler.member_joined("alice", "alice#1234").await;
        assert_eq!(notifier.count(), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        handler.member_joined("alice", "alice#1234").await;
        assert_eq!(notifier.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_and_voice_share_one_suppression_clock() {
        let (handler, notifier, _) = handler(VoiceLeavePolicy::EveryLeave);

        handler.member_joined("alice", "alice#1234").await;
        assert_eq!(notifier.count(), 1);

        // The voice join for the same user is muted by the join's clock.
        handler.voice_state_changed(join("alice", "general")).await;
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppressed_voice_event_is_dropped_entirely() {
        let (handler, notifier, voice) = handler(VoiceLeavePolicy::LastLeaves);

        handler.member_joined("alice", "alice#1234").await;
        assert_eq!(notifier.count(), 1);

        // Within the window the voice join is dropped: no notification and
        // no session is opened, so no time ever accrues from it.
        handler.voice_state_changed(join("alice", "general")).await;
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(notifier.count(), 1);
        assert_eq!(voice.total_seconds("alice"), 0);

        handler.voice_state_changed(leave("alice", "general", 0)).await;
        assert_eq!(voice.total_seconds("alice"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_events_count_again_after_window_expires() {
        let (handler, notifier, voice) = handler(VoiceLeavePolicy::LastLeaves);

        handler.member_joined("alice", "alice#1234").await;
        tokio::time::advance(Duration::from_secs(301)).await;

        handler.voice_state_changed(join("alice", "general")).await;
        assert_eq!(notifier.count(), 2);

        // The delivered voice join restarted the clock, so the leave 60s
        // later is dropped and the session stays open.
        tokio::time::advance(Duration::from_secs(60)).await;
        handler.voice_state_changed(leave("alice", "general", 0)).await;
        assert_eq!(notifier.count(), 2);
        assert_eq!(voice.total_seconds("alice"), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_leaves_policy() {
        let (handler, notifier, _) = handler(VoiceLeavePolicy::LastLeaves);

        handler.voice_state_changed(join("alice", "general")).await;
        assert_eq!(notifier.count(), 1);
        tokio::time::advance(Duration::from_secs(301)).await;

        // Two members remain: no announcement.
        handler.voice_state_changed(leave("alice", "general", 2)).await;
        assert_eq!(notifier.count(), 1);

        // Channel emptied: announce.
        handler.voice_state_changed(leave("bob", "general", 0)).await;
        assert_eq!(notifier.count(), 2);
        assert!(notifier.last().unwrap().contains("left voice channel"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_leave_policy() {
        let (handler, notifier, _) = handler(VoiceLeavePolicy::EveryLeave);

        handler.voice_state_changed(leave("alice", "general", 2)).await;
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_move_is_silent_and_keeps_time() {
        let (handler, notifier, voice) = handler(VoiceLeavePolicy::EveryLeave);

        handler.voice_state_changed(join("alice", "general")).await;
        tokio::time::advance(Duration::from_secs(301)).await;

        let mut event = join("alice", "afk");
        event.old_channel = Some("general".to_string());
        handler.voice_state_changed(event).await;
        assert_eq!(notifier.count(), 1); // the original join only

        tokio::time::advance(Duration::from_secs(15)).await;
        assert_eq!(voice.total_seconds("alice"), 316);
    }
}
