//! Episode storage trait and types.

use thiserror::Error;

use super::{EpisodeId, TrackedEpisode};

/// Error type for episode store writes.
///
/// Reads never fail: a missing or corrupt backing store loads as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode episodes: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// What `upsert` found for an episode id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Not present before; now tracked with `downloaded = false`.
    NewlyTracked,
    /// Present and already downloaded. Nothing changed.
    AlreadyDownloaded,
    /// Present and still being searched for. Nothing changed.
    AlreadySearching,
}

impl UpsertOutcome {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::NewlyTracked => "newly_tracked",
            UpsertOutcome::AlreadyDownloaded => "already_downloaded",
            UpsertOutcome::AlreadySearching => "already_searching",
        }
    }
}

/// Trait for episode storage backends.
///
/// Every mutating call is durable before it returns, so a pass
/// interrupted at any point can be resumed from what is on disk.
pub trait EpisodeStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Load all tracked episodes in insertion order.
    ///
    /// A missing or structurally invalid backing store yields an empty list.
    fn load(&self) -> Vec<TrackedEpisode>;

    /// Replace the whole store with `episodes`. Atomic from the caller's view.
    fn save(&self, episodes: &[TrackedEpisode]) -> Result<(), StoreError>;

    /// Track `candidate` if its id is unknown. See [`UpsertOutcome`].
    ///
    /// Existing entries are never modified and a new entry always starts with
    /// `downloaded = false`. Unlike `load`, this fails when the backing store
    /// can't be read, so an unreadable store is never overwritten.
    fn upsert(&self, candidate: TrackedEpisode) -> Result<UpsertOutcome, StoreError>;

    /// Set `downloaded = true` for `episode_id`.
    ///
    /// Returns whether an entry matched. An unknown id is not an error.
    fn mark_downloaded(&self, episode_id: EpisodeId) -> Result<bool, StoreError>;

    /// Episodes still to be searched for, in insertion order.
    fn list_pending(&self) -> Vec<TrackedEpisode> {
        self.load().into_iter().filter(|e| e.is_pending()).collect()
    }
}
