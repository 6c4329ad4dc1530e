//! SQLite-backed store of already-notified achievements.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use herald_models::SentAchievement;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sent_achievements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_key TEXT NOT NULL,
        trophy_id INTEGER NOT NULL,
        game_title TEXT NOT NULL,
        trophy_name TEXT NOT NULL,
        earned_at TEXT NOT NULL,
        sent_at TEXT NOT NULL,
        UNIQUE(user_key, trophy_id, game_title)
    )
";

/// Durable log of (user, trophy, title) triples already notified.
pub struct SentAchievementStore {
    conn: Mutex<Connection>,
}

impl SentAchievementStore {
    /// Opens (creating if needed) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::initialize(conn)
    }

    /// Opens a transient in-memory store, for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])?;
        info!("achievement store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Whether a notification for this trophy was already delivered to this
    /// user.
    ///
    /// Deliberately ignores `game_title`: the upstream catalog assigns
    /// trophy ids that are unique per user across titles.
    pub fn is_already_sent(&self, user_key: &str, trophy_id: u32) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM sent_achievements WHERE user_key = ?1 AND trophy_id = ?2",
                params![user_key, trophy_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Records a delivered notification. Idempotent: re-inserting an
    /// existing `(user_key, trophy_id, game_title)` triple changes nothing
    /// and is not an error.
    pub fn mark_sent(
        &self,
        user_key: &str,
        trophy_id: u32,
        game_title: &str,
        trophy_name: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<()> {
        self.insert(user_key, trophy_id, game_title, trophy_name, earned_at, Utc::now())
    }

    fn insert(
        &self,
        user_key: &str,
        trophy_id: u32,
        game_title: &str,
        trophy_name: &str,
        earned_at: DateTime<Utc>,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO sent_achievements
                 (user_key, trophy_id, game_title, trophy_name, earned_at, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![user_key, trophy_id, game_title, trophy_name, earned_at, sent_at],
        )?;
        Ok(())
    }

    /// Deletes rows whose `sent_at` precedes `now - retention_days`.
    /// Returns the number of rows removed.
    pub fn prune_older_than(&self, retention_days: i64) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM sent_achievements WHERE sent_at < ?1",
            params![cutoff],
        )?;
        if removed > 0 {
            debug!(removed, cutoff = %cutoff, "pruned old sent-achievement rows");
        }
        Ok(removed)
    }

    /// All stored rows, newest first. Debugging accessor.
    pub fn all_sent(&self) -> Result<Vec<SentAchievement>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_key, trophy_id, game_title, trophy_name, earned_at, sent_at
             FROM sent_achievements ORDER BY sent_at DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SentAchievement {
                    id: row.get(0)?,
                    user_key: row.get(1)?,
                    trophy_id: row.get(2)?,
                    game_title: row.get(3)?,
                    trophy_name: row.get(4)?,
                    earned_at: row.get(5)?,
                    sent_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Test-only insert with an explicit `sent_at`, for retention tests.
    #[cfg(test)]
    fn mark_sent_at(
        &self,
        user_key: &str,
        trophy_id: u32,
        game_title: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        self.insert(user_key, trophy_id, game_title, "trophy", Utc::now(), sent_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SentAchievementStore {
        SentAchievementStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_mark_then_check() {
        let store = store();
        assert!(!store.is_already_sent("alice", 7).unwrap());

        store
            .mark_sent("alice", 7, "Hades", "Escaped Tartarus", Utc::now())
            .unwrap();

        assert!(store.is_already_sent("alice", 7).unwrap());
        // The check ignores game_title but not the user.
        assert!(!store.is_already_sent("bob", 7).unwrap());
        assert!(!store.is_already_sent("alice", 8).unwrap());
    }

    #[test]
    fn test_mark_sent_is_idempotent() {
        let store = store();
        store
            .mark_sent("alice", 7, "Hades", "Escaped Tartarus", Utc::now())
            .unwrap();
        store
            .mark_sent("alice", 7, "Hades", "Escaped Tartarus", Utc::now())
            .unwrap();

        assert_eq!(store.all_sent().unwrap().len(), 1);
    }

    #[test]
    fn test_prune_removes_only_old_rows() {
        let store = store();
        let now = Utc::now();
        store
            .mark_sent_at("alice", 1, "Hades", now - Duration::days(10))
            .unwrap();
        store
            .mark_sent_at("alice", 2, "Hades", now - Duration::hours(1))
            .unwrap();

        assert_eq!(store.prune_older_than(7).unwrap(), 1);
        let remaining = store.all_sent().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].trophy_id, 2);

        // A second run in succession is a no-op.
        assert_eq!(store.prune_older_than(7).unwrap(), 0);
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("achievements.db");

        {
            let store = SentAchievementStore::open(&path).unwrap();
            store
                .mark_sent("alice", 42, "Celeste", "Reach the Summit", Utc::now())
                .unwrap();
        }

        let reopened = SentAchievementStore::open(&path).unwrap();
        assert!(reopened.is_already_sent("alice", 42).unwrap());

        let rows = reopened.all_sent().unwrap();
        assert_eq!(rows[0].game_title, "Celeste");
        assert_eq!(rows[0].trophy_name, "Reach the Summit");
    }

    #[test]
    fn test_all_sent_orders_newest_first() {
        let store = store();
        let now = Utc::now();
        store.mark_sent_at("alice", 1, "Hades", now - Duration::days(2)).unwrap();
        store.mark_sent_at("alice", 2, "Hades", now - Duration::days(1)).unwrap();

        let rows = store.all_sent().unwrap();
        assert_eq!(rows[0].trophy_id, 2);
        assert_eq!(rows[1].trophy_id, 1);
    }
}
