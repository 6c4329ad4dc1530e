//! Thin client over the PSN trophy API plus the catalog/earned-status join.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use herald_models::{TrophyRarity, TrophyRecord, TrophyTier};
use serde::Deserialize;

use crate::auth::AccessToken;
use crate::error::{PsnError, Result};

const TROPHY_BASE: &str = "https://m.np.playstation.com/api/trophy/v1";

/// One page of a user's trophy title listing, newest first.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophyTitlesPage {
    pub trophy_titles: Vec<TitleSummary>,
    /// Cursor for the next page; absent on the last page.
    pub next_offset: Option<u32>,
}

/// Summary of one title in the user's library.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSummary {
    pub np_communication_id: String,
    pub trophy_title_name: String,
    pub trophy_title_platform: String,
    /// Completion percentage, 0-100.
    pub progress: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleTrophiesPage {
    pub trophies: Vec<CatalogTrophy>,
}

/// Catalog metadata for one trophy (names and descriptions).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrophy {
    pub trophy_id: u32,
    pub trophy_name: Option<String>,
    pub trophy_detail: Option<String>,
    pub trophy_icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedTrophiesPage {
    pub trophies: Vec<EarnedTrophy>,
}

/// One user's earned status for one trophy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedTrophy {
    pub trophy_id: u32,
    pub trophy_type: TrophyTier,
    pub earned: Option<bool>,
    pub earned_date_time: Option<DateTime<Utc>>,
    /// Rarity bucket: 0 = ultra rare .. 3 = common.
    pub trophy_rare: Option<u8>,
    pub trophy_earned_rate: Option<String>,
}

/// HTTP client for the trophy API.
///
/// Redirects are disabled on the inner client because the OAuth authorize
/// step (see [`crate::auth`]) must observe the 302 itself.
pub struct PsnClient {
    http: reqwest::Client,
}

impl PsnClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Fetches one page of the user's trophy titles, most recently played
    /// first.
    pub async fn user_titles(&self, token: &AccessToken, offset: u32) -> Result<TrophyTitlesPage> {
        let url = format!("{TROPHY_BASE}/users/me/trophyTitles?limit=100&offset={offset}");
        self.get_json(&url, token).await
    }

    /// Fetches catalog metadata for every trophy in a title.
    pub async fn title_trophies(
        &self,
        token: &AccessToken,
        np_communication_id: &str,
        platform: &str,
    ) -> Result<TitleTrophiesPage> {
        let url = format!(
            "{TROPHY_BASE}/npCommunicationIds/{np_communication_id}/trophyGroups/all/trophies{}",
            service_suffix(platform)
        );
        self.get_json(&url, token).await
    }

    /// Fetches the authenticated user's earned status for every trophy in a
    /// title.
    pub async fn earned_trophies(
        &self,
        token: &AccessToken,
        np_communication_id: &str,
        platform: &str,
    ) -> Result<EarnedTrophiesPage> {
        let url = format!(
            "{TROPHY_BASE}/users/me/npCommunicationIds/{np_communication_id}/trophyGroups/all/trophies{}",
            service_suffix(platform)
        );
        self.get_json(&url, token).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &AccessToken,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PsnError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Titles published for PS5 live under the `trophy2` service, which is the
/// API default; everything older needs an explicit service name.
fn service_suffix(platform: &str) -> &'static str {
    if platform.contains("PS5") {
        ""
    } else {
        "?npServiceName=trophy"
    }
}

/// Joins catalog metadata with one user's earned status, preserving the
/// earned list's order.
pub fn join_trophies(catalog: Vec<CatalogTrophy>, earned: Vec<EarnedTrophy>) -> Vec<TrophyRecord> {
    let by_id: HashMap<u32, CatalogTrophy> =
        catalog.into_iter().map(|t| (t.trophy_id, t)).collect();

    earned
        .into_iter()
        .map(|e| {
            let info = by_id.get(&e.trophy_id);
            TrophyRecord {
                trophy_id: e.trophy_id,
                name: info
                    .and_then(|i| i.trophy_name.clone())
                    .unwrap_or_else(|| "Unknown Trophy".to_string()),
                details: info.and_then(|i| i.trophy_detail.clone()),
                icon_url: info.and_then(|i| i.trophy_icon_url.clone()),
                tier: e.trophy_type,
                rarity: rarity_from_psn(e.trophy_rare),
                earned: e.earned.unwrap_or(false),
                earned_at: e.earned_date_time,
                earned_rate_percent: e.trophy_earned_rate,
            }
        })
        .collect()
}

fn rarity_from_psn(raw: Option<u8>) -> TrophyRarity {
    match raw {
        Some(0) => TrophyRarity::UltraRare,
        Some(1) => TrophyRarity::VeryRare,
        Some(2) => TrophyRarity::Rare,
        _ => TrophyRarity::Common,
    }
}
