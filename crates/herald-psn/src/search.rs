//! Paginated search over a user's trophy title listing.

use std::future::Future;

use herald_models::AchievementTitle;
use tracing::debug;

use crate::client::{TitleSummary, TrophyTitlesPage};
use crate::error::{PsnError, Result};
use crate::source::PsnTrophySource;

impl PsnTrophySource {
    /// Finds the first title in the user's library matching `query` and
    /// returns its earned trophies.
    ///
    /// Walks the paginated title listing until a match or exhaustion. A
    /// title matches when its display name contains every
    /// whitespace-delimited token of the query, case-insensitively and in
    /// any order. Exhaustion yields [`AchievementTitle::empty`].
    pub async fn search_trophies(&self, nickname: &str, query: &str) -> Result<AchievementTitle> {
        if query.trim().is_empty() {
            return Err(PsnError::EmptyQuery);
        }

        let token = self.authenticate_user(nickname).await?;

        let matched =
            find_matching_title(query, |offset| self.client().user_titles(&token, offset)).await?;

        let Some(title) = matched else {
            debug!(user = %nickname, query = %query, "no title matched search query");
            return Ok(AchievementTitle::empty());
        };

        let mut result = self.trophies_for_title(&token, &title).await?;
        // Unlike the latest-title poll, the search surface only reports
        // trophies the user has actually earned.
        result.trophies.retain(|t| t.earned);
        Ok(result)
    }
}

/// Walks the title listing page by page, following `next_offset` cursors,
/// and returns the first title matching `query`. `None` when every page is
/// exhausted without a match.
pub(crate) async fn find_matching_title<F, Fut>(
    query: &str,
    mut fetch_page: F,
) -> Result<Option<TitleSummary>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<TrophyTitlesPage>>,
{
    let mut offset = 0;
    loop {
        let page = fetch_page(offset).await?;
        if let Some(title) = page
            .trophy_titles
            .into_iter()
            .find(|t| title_matches(&t.trophy_title_name, query))
        {
            return Ok(Some(title));
        }
        match page.next_offset {
            Some(next) => offset = next,
            None => return Ok(None),
        }
    }
}

/// All-tokens-match semantics: every whitespace-delimited token of the
/// query must appear as a substring of the title name, case-folded.
pub(crate) fn title_matches(title_name: &str, query: &str) -> bool {
    let name = title_name.to_lowercase();
    query
        .split_whitespace()
        .all(|token| name.contains(&token.to_lowercase()))
}
