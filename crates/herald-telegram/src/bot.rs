//! Bot wiring: builds every component from configuration and runs the
//! dispatcher.

use std::sync::Arc;

use herald_core::{HeraldConfig, Notifier};
use herald_psn::{PsnTrophySource, TrophySource};
use herald_runtime::{AchievementScheduler, IgnoreList, PresenceHandler, SchedulerConfig, VoiceTracker};
use herald_store::SentAchievementStore;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::{info, warn};

use crate::error::Result;
use crate::handlers::{handle_command, Command};
use crate::notifier::TelegramNotifier;
use crate::state::BotState;

/// The Herald Telegram bot and the pipeline behind it.
pub struct HeraldBot {
    bot: Bot,
    state: Arc<BotState>,
    scheduler: Arc<AchievementScheduler>,
    presence: Arc<PresenceHandler>,
}

impl HeraldBot {
    /// Builds the full pipeline from validated configuration.
    pub fn new(config: &HeraldConfig) -> Result<Self> {
        let bot = Bot::new(config.telegram_token.clone());
        let chat_id = ChatId(config.telegram_chat_id);
        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone(), chat_id));

        let store = Arc::new(SentAchievementStore::open(&config.db_path)?);
        let psn = Arc::new(PsnTrophySource::new(config.psn_tokens.clone())?);

        let mut users: Vec<String> = config.psn_tokens.keys().cloned().collect();
        users.sort();

        let scheduler = Arc::new(AchievementScheduler::new(
            vec![Arc::clone(&psn) as Arc<dyn TrophySource>],
            store,
            Arc::clone(&notifier),
            SchedulerConfig {
                poll_interval: config.poll_interval,
                retention_days: config.retention_days,
                tracked_tiers: config.tracked_tiers.clone(),
                users,
            },
        ));

        let voice = Arc::new(VoiceTracker::new());
        let presence = Arc::new(PresenceHandler::new(
            Arc::new(IgnoreList::new(config.ignore_duration)),
            Arc::clone(&voice),
            notifier,
            config.voice_leave_policy,
        ));

        let state = Arc::new(BotState {
            chat_id,
            psn,
            voice,
        });

        Ok(Self {
            bot,
            state,
            scheduler,
            presence,
        })
    }

    /// The inbound boundary the chat-platform collaborator invokes for
    /// member-join and voice-state events.
    pub fn presence(&self) -> Arc<PresenceHandler> {
        Arc::clone(&self.presence)
    }

    /// Starts the achievement scheduler and dispatches commands until the
    /// process is interrupted.
    pub async fn run(&self) -> Result<()> {
        let me = self.bot.get_me().await?;
        info!(username = %me.username(), "telegram bot authenticated");

        self.scheduler.start();

        let state = Arc::clone(&self.state);
        let handler = Update::filter_message()
            .filter_command::<Command>()
            .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                let state = Arc::clone(&state);
                async move { handle_command(bot, msg, cmd, state).await }
            });

        info!("bot is running");
        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|update| async move {
                warn!(update_id = ?update.id, "unhandled update");
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        self.scheduler.stop();
        Ok(())
    }
}
