//! SQLite-backed episode store implementation.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::warn;

use super::{EpisodeId, EpisodeStore, StoreError, TrackedEpisode, UpsertOutcome};

/// SQLite-backed episode store.
pub struct SqliteEpisodeStore {
    conn: Mutex<Connection>,
}

const SELECT_COLUMNS: &str = "SELECT episode_id, show_title, season, episode, external_id, air_date_utc, quality_profile_id, downloaded FROM episodes";

impl SqliteEpisodeStore {
    /// Create a new SQLite episode store, creating the database file and tables if needed.
    ///
    /// A file that is not a usable database is moved to `<path>.corrupt` and
    /// the store starts empty.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = match Self::open(path) {
            Ok(conn) => conn,
            Err(e) if is_corrupt(&e) => {
                let backup = corrupt_path(path);
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "Episode database is corrupt, starting empty"
                );
                fs::rename(path, &backup)?;
                Self::open(path)?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open(path: &Path) -> rusqlite::Result<Connection> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(conn)
    }

    /// Create an in-memory SQLite episode store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS episodes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                episode_id INTEGER NOT NULL UNIQUE,
                show_title TEXT NOT NULL,
                season INTEGER NOT NULL,
                episode INTEGER NOT NULL,
                external_id TEXT,
                air_date_utc TEXT NOT NULL,
                quality_profile_id INTEGER NOT NULL,
                downloaded INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn row_to_episode(row: &rusqlite::Row) -> rusqlite::Result<TrackedEpisode> {
        let episode_id: i64 = row.get(0)?;
        let air_date_str: String = row.get(5)?;
        let quality_profile_id: i64 = row.get(6)?;

        let air_date_utc = DateTime::parse_from_rfc3339(&air_date_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(TrackedEpisode {
            episode_id: episode_id as EpisodeId,
            show_title: row.get(1)?,
            season: row.get(2)?,
            episode: row.get(3)?,
            external_id: row.get(4)?,
            air_date_utc,
            quality_profile_id: quality_profile_id as u64,
            downloaded: row.get(7)?,
        })
    }

    fn insert(conn: &Connection, episode: &TrackedEpisode) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO episodes (episode_id, show_title, season, episode, external_id, air_date_utc, quality_profile_id, downloaded) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                episode.episode_id as i64,
                episode.show_title,
                episode.season,
                episode.episode,
                episode.external_id,
                episode.air_date_utc.to_rfc3339(),
                episode.quality_profile_id as i64,
                episode.downloaded,
            ],
        )
    }

    fn query(conn: &Connection, clause: &str) -> rusqlite::Result<Vec<TrackedEpisode>> {
        let mut stmt = conn.prepare(&format!("{} {} ORDER BY seq", SELECT_COLUMNS, clause))?;
        let rows = stmt.query_map([], Self::row_to_episode)?;

        let mut episodes = Vec::new();
        for row in rows {
            match row {
                Ok(episode) => episodes.push(episode),
                Err(e) => warn!(error = %e, "Skipping invalid episode row"),
            }
        }
        Ok(episodes)
    }
}

fn is_corrupt(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt)
    )
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".corrupt");
    PathBuf::from(name)
}

impl EpisodeStore for SqliteEpisodeStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self) -> Vec<TrackedEpisode> {
        let conn = self.lock();
        Self::query(&conn, "").unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read episode store, treating as empty");
            Vec::new()
        })
    }

    fn save(&self, episodes: &[TrackedEpisode]) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM episodes", [])?;
        for episode in episodes {
            Self::insert(&tx, episode)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn upsert(&self, candidate: TrackedEpisode) -> Result<UpsertOutcome, StoreError> {
        let conn = self.lock();

        let existing: Option<bool> = conn
            .query_row(
                "SELECT downloaded FROM episodes WHERE episode_id = ?",
                params![candidate.episode_id as i64],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(true) => Ok(UpsertOutcome::AlreadyDownloaded),
            Some(false) => Ok(UpsertOutcome::AlreadySearching),
            None => {
                Self::insert(
                    &conn,
                    &TrackedEpisode {
                        downloaded: false,
                        ..candidate
                    },
                )?;
                Ok(UpsertOutcome::NewlyTracked)
            }
        }
    }

    fn mark_downloaded(&self, episode_id: EpisodeId) -> Result<bool, StoreError> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE episodes SET downloaded = 1 WHERE episode_id = ?",
            params![episode_id as i64],
        )?;
        Ok(changed > 0)
    }

    fn list_pending(&self) -> Vec<TrackedEpisode> {
        let conn = self.lock();
        Self::query(&conn, "WHERE downloaded = 0 AND external_id IS NOT NULL").unwrap_or_else(
            |e| {
                warn!(error = %e, "Failed to list pending episodes");
                Vec::new()
            },
        )
    }
}
