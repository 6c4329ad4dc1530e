//! Periodic achievement polling.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use herald_core::{capitalize, format_timestamp, tier_emoji, MessageFormat, Notifier};
use herald_models::{AchievementTitle, TrophyRecord, TrophyTier};
use herald_psn::TrophySource;
use herald_store::SentAchievementStore;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Scheduler settings, derived from configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between poll cycles.
    pub poll_interval: Duration,
    /// Retention horizon for sent-achievement rows.
    pub retention_days: i64,
    /// Trophy tiers that trigger notifications.
    pub tracked_tiers: Vec<TrophyTier>,
    /// Nicknames of the users to poll.
    pub users: Vec<String>,
}

/// Drives periodic polling of all configured users through every registered
/// trophy source.
///
/// State machine: Stopped -> Running on [`start`](Self::start) (one
/// immediate cycle, then a repeating timer), Running -> Stopped on
/// [`stop`](Self::stop). Stopping cancels only future ticks; an in-flight
/// cycle runs to completion.
pub struct AchievementScheduler {
    sources: Vec<Arc<dyn TrophySource>>,
    store: Arc<SentAchievementStore>,
    notifier: Arc<dyn Notifier>,
    config: SchedulerConfig,
    /// `Some` iff the scheduler is running.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl AchievementScheduler {
    pub fn new(
        sources: Vec<Arc<dyn TrophySource>>,
        store: Arc<SentAchievementStore>,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
    ) -> Self {
        info!(
            interval_s = config.poll_interval.as_secs(),
            users = config.users.len(),
            "achievement scheduler initialized"
        );
        Self {
            sources,
            store,
            notifier,
            config,
            shutdown: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Starts the polling loop. A no-op if already running.
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.shutdown.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            warn!("achievement scheduler is already running");
            return;
        }

        let (tx, rx) = watch::channel(false);
        *guard = Some(tx);
        drop(guard);

        info!("starting achievement scheduler");
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.run_loop(rx).await;
        });
    }

    /// Stops the polling loop. Cancels future ticks only; an in-flight
    /// cycle completes.
    pub fn stop(&self) {
        let tx = self
            .shutdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match tx {
            Some(tx) => {
                let _ = tx.send(true);
                info!("achievement scheduler stopped");
            }
            None => debug!("achievement scheduler is not running"),
        }
    }

    async fn run_loop(&self, mut shutdown: watch::Receiver<bool>) {
        // The first tick completes immediately, giving the start-time cycle.
        let mut ticker = interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!("scheduler received shutdown signal");
                        break;
                    }
                }
            }
        }
    }

    /// Runs one poll cycle: every user through every source, sequentially,
    /// with per-user failure isolation, followed by unconditional retention
    /// pruning.
    pub async fn poll_once(&self) {
        debug!("checking for new achievements");

        for user in &self.config.users {
            for source in &self.sources {
                match source.today_latest_trophies(user).await {
                    Ok(title) if !title.is_empty() => {
                        self.process_trophies(user, title).await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(user = %user, error = %e, "achievement check failed");
                    }
                }
            }
        }

        // Pruning runs after notification so a freshly-sent row is never
        // eligible for eviction within its own cycle.
        match self.store.prune_older_than(self.config.retention_days) {
            Ok(removed) if removed > 0 => {
                info!(removed, "pruned old sent-achievement records");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "failed to prune old records"),
        }
    }

    async fn process_trophies(&self, user: &str, title: AchievementTitle) {
        let game_title = title
            .game_title
            .unwrap_or_else(|| "Unknown Game Title".to_string());

        for trophy in title.trophies {
            if !self.config.tracked_tiers.contains(&trophy.tier) {
                continue;
            }
            let Some(earned_at) = trophy.earned_at else {
                continue;
            };
            if !earned_today(earned_at, Local::now()) {
                continue;
            }

            // Fail closed: an unreadable store must not produce duplicate
            // spam. The trophy stays unmarked, so a later cycle retries.
            match self.store.is_already_sent(user, trophy.trophy_id) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        user = %user,
                        trophy_id = trophy.trophy_id,
                        error = %e,
                        "dedup check failed; skipping trophy this cycle"
                    );
                    continue;
                }
            }

            let message = achievement_message(user, &trophy, &game_title);
            self.notifier.deliver(&message, MessageFormat::Markdown).await;

            if let Err(e) = self.store.mark_sent(
                user,
                trophy.trophy_id,
                &game_title,
                &trophy.name,
                earned_at,
            ) {
                error!(
                    user = %user,
                    trophy = %trophy.name,
                    error = %e,
                    "failed to record sent achievement; a duplicate is possible next cycle"
                );
            } else {
                info!(
                    user = %user,
                    trophy = %trophy.name,
                    game = %game_title,
                    "achievement notification sent"
                );
            }
        }
    }
}

/// Whether a trophy's earn time falls on the current calendar day in the
/// caller's local timezone.
fn earned_today(earned_at: DateTime<Utc>, now: DateTime<Local>) -> bool {
    earned_at.with_timezone(&now.timezone()).date_naive() == now.date_naive()
}

/// Formats the achievement notification message.
fn achievement_message(user: &str, trophy: &TrophyRecord, game_title: &str) -> String {
    let emoji = tier_emoji(trophy.tier);
    let earned_rate = trophy
        .earned_rate_percent
        .as_deref()
        .map(|rate| format!(" - {rate}% earned"))
        .unwrap_or_default();
    let earned = trophy
        .earned_at
        .map(format_timestamp)
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "{emoji} *New Achievement! ({tier})*\n\n\
         👤 *Player:* {player}\n\
         🎮 *Game:* {game_title}\n\
         {emoji} *Trophy:* {name} ({rarity})\n\
         📝 *Description:* {details}\n\
         ⏰ *Earned:* {earned}{earned_rate}",
        tier = trophy.tier,
        player = capitalize(user),
        name = trophy.name,
        rarity = trophy.rarity,
        details = trophy.details.as_deref().unwrap_or("No description"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use chrono::TimeZone;
    use herald_models::TrophyRarity;
    use herald_psn::{PsnError, Result as PsnResult};
    use std::sync::Mutex as StdMutex;

    /// Trophy source returning a fixed snapshot per user.
    struct FixedSource {
        titles: std::collections::HashMap<String, AchievementTitle>,
    }

    #[async_trait]
    impl TrophySource for FixedSource {
        async fn today_latest_trophies(&self, nickname: &str) -> PsnResult<AchievementTitle> {
            self.titles
                .get(nickname)
                .cloned()
                .ok_or_else(|| PsnError::UnknownUser {
                    nickname: nickname.to_string(),
                    known: vec![],
                })
        }
    }

    /// Notifier that records every delivered message.
    struct RecordingNotifier {
        messages: StdMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                messages: StdMutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, text: &str, _format: MessageFormat) {
            self.messages.lock().unwrap().push(text.to_string());
        }
    }

    fn trophy(id: u32, name: &str, tier: TrophyTier, earned_at: Option<DateTime<Utc>>) -> TrophyRecord {
        TrophyRecord {
            trophy_id: id,
            name: name.to_string(),
            details: Some("details".to_string()),
            icon_url: None,
            tier,
            rarity: TrophyRarity::Rare,
            earned: earned_at.is_some(),
            earned_at,
            earned_rate_percent: Some("5.0".to_string()),
        }
    }

    fn scheduler_with(
        titles: Vec<(&str, AchievementTitle)>,
        tracked: Vec<TrophyTier>,
    ) -> (Arc<AchievementScheduler>, Arc<RecordingNotifier>, Arc<SentAchievementStore>) {
        let users: Vec<String> = titles.iter().map(|(u, _)| u.to_string()).collect();
        let source = FixedSource {
            titles: titles
                .into_iter()
                .map(|(u, t)| (u.to_string(), t))
                .collect(),
        };
        let store = Arc::new(SentAchievementStore::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let scheduler = Arc::new(AchievementScheduler::new(
            vec![Arc::new(source)],
            Arc::clone(&store),
            notifier.clone() as Arc<dyn Notifier>,
            SchedulerConfig {
                poll_interval: Duration::from_secs(300),
                retention_days: 7,
                tracked_tiers: tracked,
                users,
            },
        ));
        (scheduler, notifier, store)
    }

    #[tokio::test]
    async fn test_first_cycle_notifies_second_does_not() {
        let title = AchievementTitle {
            game_title: Some("Hades".to_string()),
            progress_percent: 30,
            trophies: vec![trophy(1, "Escaped Tartarus", TrophyTier::Gold, Some(Utc::now()))],
        };
        let (scheduler, notifier, store) =
            scheduler_with(vec![("alice", title)], TrophyTier::ALL.to_vec());

        scheduler.poll_once().await;
        assert_eq!(notifier.count(), 1);
        assert_eq!(store.all_sent().unwrap().len(), 1);

        // Identical second cycle: already sent, nothing new.
        scheduler.poll_once().await;
        assert_eq!(notifier.count(), 1);
        assert_eq!(store.all_sent().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_yesterdays_trophy_is_excluded() {
        let title = AchievementTitle {
            game_title: Some("Hades".to_string()),
            progress_percent: 30,
            trophies: vec![trophy(
                1,
                "Old News",
                TrophyTier::Gold,
                Some(Utc::now() - ChronoDuration::days(1)),
            )],
        };
        let (scheduler, notifier, _) =
            scheduler_with(vec![("alice", title)], TrophyTier::ALL.to_vec());

        scheduler.poll_once().await;
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_untracked_tier_is_excluded() {
        let title = AchievementTitle {
            game_title: Some("Hades".to_string()),
            progress_percent: 30,
            trophies: vec![trophy(1, "Common Fare", TrophyTier::Bronze, Some(Utc::now()))],
        };
        let (scheduler, notifier, _) =
            scheduler_with(vec![("alice", title)], vec![TrophyTier::Platinum]);

        scheduler.poll_once().await;
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_one_users_failure_does_not_block_others() {
        // "alice" is configured but missing from the source, so her check
        // errors; bob's must still go through.
        let bob_title = AchievementTitle {
            game_title: Some("Celeste".to_string()),
            progress_percent: 10,
            trophies: vec![trophy(2, "Reach the Summit", TrophyTier::Gold, Some(Utc::now()))],
        };
        let (scheduler, notifier, _) = {
            let source = FixedSource {
                titles: [("bob".to_string(), bob_title)].into_iter().collect(),
            };
            let store = Arc::new(SentAchievementStore::open_in_memory().unwrap());
            let notifier = Arc::new(RecordingNotifier::new());
            let scheduler = Arc::new(AchievementScheduler::new(
                vec![Arc::new(source)],
                store,
                notifier.clone() as Arc<dyn Notifier>,
                SchedulerConfig {
                    poll_interval: Duration::from_secs(300),
                    retention_days: 7,
                    tracked_tiers: TrophyTier::ALL.to_vec(),
                    users: vec!["alice".to_string(), "bob".to_string()],
                },
            ));
            (scheduler, notifier, ())
        };

        scheduler.poll_once().await;
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test]
    async fn test_start_twice_is_a_noop_and_stop_halts() {
        let (scheduler, _, _) = scheduler_with(vec![], TrophyTier::ALL.to_vec());

        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.start(); // logged no-op
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());
        scheduler.stop(); // also a no-op
    }

    #[test]
    fn test_earned_today_boundaries() {
        let tz = Local;
        let now = tz.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        let same_day = now.with_timezone(&Utc) - ChronoDuration::hours(2);
        assert!(earned_today(same_day, now));

        let yesterday = now.with_timezone(&Utc) - ChronoDuration::hours(24);
        assert!(!earned_today(yesterday, now));
    }

    #[test]
    fn test_achievement_message_contents() {
        let t = trophy(1, "Escaped Tartarus", TrophyTier::Gold, Some(Utc::now()));
        let message = achievement_message("alice", &t, "Hades");

        assert!(message.contains("🥇"));
        assert!(message.contains("*Player:* Alice"));
        assert!(message.contains("*Game:* Hades"));
        assert!(message.contains("Escaped Tartarus (rare)"));
        assert!(message.contains("5.0% earned"));
    }
}
