//! Set-difference comparison of two users' progress on the same title.

use herald_models::{AchievementTitle, TrophyRecord};

use crate::error::{PsnError, Result};
use crate::source::PsnTrophySource;

/// Result of comparing two users' earned trophies for one title.
#[derive(Debug)]
pub struct TrophyComparison {
    /// The matched game title.
    pub game_title: String,
    /// Trophies only the first user earned, in their original earn order.
    pub only_a: Vec<TrophyRecord>,
    /// Trophies only the second user earned, in their original earn order.
    pub only_b: Vec<TrophyRecord>,
}

impl PsnTrophySource {
    /// Compares two users' earned trophies for the title matching `query`.
    ///
    /// Comparisons reuse the search path and bypass the scheduler and the
    /// deduplication store entirely.
    pub async fn compare(
        &self,
        nickname_a: &str,
        nickname_b: &str,
        query: &str,
    ) -> Result<TrophyComparison> {
        let a = self.search_trophies(nickname_a, query).await?;
        let b = self.search_trophies(nickname_b, query).await?;
        compare_titles(a, b, nickname_a, nickname_b)
    }
}

/// Pure comparison over two already-fetched trophy sets.
pub(crate) fn compare_titles(
    a: AchievementTitle,
    b: AchievementTitle,
    nickname_a: &str,
    nickname_b: &str,
) -> Result<TrophyComparison> {
    if a.is_empty() {
        return Err(PsnError::NoTrophies(nickname_a.to_string()));
    }
    if b.is_empty() {
        return Err(PsnError::NoTrophies(nickname_b.to_string()));
    }

    let title_a = a.game_title.unwrap_or_default();
    let title_b = b.game_title.unwrap_or_default();
    if !title_a.eq_ignore_ascii_case(&title_b) {
        return Err(PsnError::TitleMismatch {
            a: title_a,
            b: title_b,
        });
    }

    // Cross-account trophy ids are expected to be stable for one title,
    // but the diff keys on the human-readable name to tolerate catalog
    // drift between accounts.
    Ok(TrophyComparison {
        only_a: diff_by_name(&a.trophies, &b.trophies),
        only_b: diff_by_name(&b.trophies, &a.trophies),
        game_title: title_a,
    })
}

/// Trophies in `left` whose name does not appear anywhere in `right`,
/// preserving `left`'s order.
fn diff_by_name(left: &[TrophyRecord], right: &[TrophyRecord]) -> Vec<TrophyRecord> {
    left.iter()
        .filter(|l| !right.iter().any(|r| r.name == l.name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_models::{TrophyRarity, TrophyTier};

    fn trophy(id: u32, name: &str) -> TrophyRecord {
        TrophyRecord {
            trophy_id: id,
            name: name.to_string(),
            details: None,
            icon_url: None,
            tier: TrophyTier::Bronze,
            rarity: TrophyRarity::Common,
            earned: true,
            earned_at: None,
            earned_rate_percent: None,
        }
    }

    fn title(name: &str, trophies: Vec<TrophyRecord>) -> AchievementTitle {
        AchievementTitle {
            game_title: Some(name.to_string()),
            progress_percent: 50,
            trophies,
        }
    }

    #[test]
    fn test_symmetric_difference_by_name() {
        let a = title("Hades", vec![trophy(1, "Alpha"), trophy(2, "Beta")]);
        let b = title("Hades", vec![trophy(2, "Beta"), trophy(3, "Gamma")]);

        let cmp = compare_titles(a, b, "alice", "bob").unwrap();
        assert_eq!(cmp.game_title, "Hades");
        assert_eq!(
            cmp.only_a.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["Alpha"]
        );
        assert_eq!(
            cmp.only_b.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["Gamma"]
        );
    }

    #[test]
    fn test_name_key_ignores_trophy_id_drift() {
        // Same trophy under different catalog ids still counts as shared.
        let a = title("Hades", vec![trophy(1, "Alpha")]);
        let b = title("Hades", vec![trophy(9, "Alpha")]);

        let cmp = compare_titles(a, b, "alice", "bob").unwrap();
        assert!(cmp.only_a.is_empty());
        assert!(cmp.only_b.is_empty());
    }

    #[test]
    fn test_earn_order_is_preserved() {
        let a = title(
            "Hades",
            vec![trophy(3, "Third"), trophy(1, "First"), trophy(2, "Second")],
        );
        let b = title("Hades", vec![trophy(1, "First")]);

        let cmp = compare_titles(a, b, "alice", "bob").unwrap();
        assert_eq!(
            cmp.only_a.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["Third", "Second"]
        );
    }

    #[test]
    fn test_title_mismatch_is_case_insensitive() {
        let a = title("HADES", vec![trophy(1, "Alpha")]);
        let b = title("hades", vec![trophy(2, "Beta")]);
        assert!(compare_titles(a, b, "alice", "bob").is_ok());

        let a = title("Hades", vec![trophy(1, "Alpha")]);
        let b = title("Celeste", vec![trophy(2, "Beta")]);
        let err = compare_titles(a, b, "alice", "bob").unwrap_err();
        assert!(matches!(err, PsnError::TitleMismatch { .. }));
    }

    #[test]
    fn test_empty_side_reports_which_user() {
        let a = title("Hades", vec![]);
        let b = title("Hades", vec![trophy(2, "Beta")]);
        let err = compare_titles(a, b, "alice", "bob").unwrap_err();
        match err {
            PsnError::NoTrophies(user) => assert_eq!(user, "alice"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
