//! The polymorphic trophy source contract and its PSN implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use herald_models::AchievementTitle;
use tracing::debug;

use crate::auth::{authenticate, AccessToken};
use crate::client::{join_trophies, PsnClient, TitleSummary};
use crate::error::{PsnError, Result};

/// A platform that can report the trophies a user earned today for their
/// most recently played title.
///
/// The scheduler drives every registered source; adding an achievement
/// platform means implementing this trait and registering it, nothing more.
#[async_trait]
pub trait TrophySource: Send + Sync {
    /// Full trophy snapshot (earned and unearned) for the user's most
    /// recently played title. A user with no titles at all yields
    /// [`AchievementTitle::empty`], not an error.
    async fn today_latest_trophies(&self, nickname: &str) -> Result<AchievementTitle>;
}

/// PSN-backed trophy source.
///
/// Credentials are NPSSO tokens keyed by operator-chosen nickname,
/// supplied by configuration.
pub struct PsnTrophySource {
    credentials: HashMap<String, String>,
    client: PsnClient,
}

impl PsnTrophySource {
    pub fn new(credentials: HashMap<String, String>) -> Result<Self> {
        Ok(Self {
            credentials,
            client: PsnClient::new()?,
        })
    }

    pub(crate) fn client(&self) -> &PsnClient {
        &self.client
    }

    /// Resolves a nickname to its NPSSO credential.
    pub(crate) fn credential(&self, nickname: &str) -> Result<&str> {
        self.credentials
            .get(&nickname.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| {
                let mut known: Vec<String> = self.credentials.keys().cloned().collect();
                known.sort();
                PsnError::UnknownUser {
                    nickname: nickname.to_string(),
                    known,
                }
            })
    }

    pub(crate) async fn authenticate_user(&self, nickname: &str) -> Result<AccessToken> {
        let npsso = self.credential(nickname)?;
        authenticate(self.client.http(), npsso).await
    }

    /// Fetches the full catalog-joined trophy list for one title.
    pub(crate) async fn trophies_for_title(
        &self,
        token: &AccessToken,
        title: &TitleSummary,
    ) -> Result<AchievementTitle> {
        let catalog = self
            .client
            .title_trophies(token, &title.np_communication_id, &title.trophy_title_platform)
            .await?;
        let earned = self
            .client
            .earned_trophies(token, &title.np_communication_id, &title.trophy_title_platform)
            .await?;

        Ok(AchievementTitle {
            game_title: Some(title.trophy_title_name.clone()),
            progress_percent: title.progress,
            trophies: join_trophies(catalog.trophies, earned.trophies),
        })
    }
}

#[async_trait]
impl TrophySource for PsnTrophySource {
    async fn today_latest_trophies(&self, nickname: &str) -> Result<AchievementTitle> {
        let token = self.authenticate_user(nickname).await?;

        let page = self.client.user_titles(&token, 0).await?;
        let Some(latest) = page.trophy_titles.first() else {
            debug!(user = %nickname, "user has no trophy titles");
            return Ok(AchievementTitle::empty());
        };

        self.trophies_for_title(&token, latest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PsnTrophySource {
        let mut credentials = HashMap::new();
        credentials.insert("alice".to_string(), "npsso-a".to_string());
        credentials.insert("bob".to_string(), "npsso-b".to_string());
        PsnTrophySource::new(credentials).unwrap()
    }

    #[test]
    fn test_credential_lookup_is_case_insensitive() {
        let source = source();
        assert_eq!(source.credential("Alice").unwrap(), "npsso-a");
        assert_eq!(source.credential("bob").unwrap(), "npsso-b");
    }

    #[test]
    fn test_unknown_user_enumerates_valid_nicknames() {
        let source = source();
        let err = source.credential("mallory").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mallory"));
        assert!(message.contains("alice"));
        assert!(message.contains("bob"));
    }
}
