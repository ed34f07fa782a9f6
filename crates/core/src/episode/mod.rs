//! Episode tracking store.
//!
//! The store is a permanent ledger of every aired episode the calendar has
//! reported. Entries are never removed; `downloaded` only ever goes from
//! `false` to `true`.

mod json_store;
mod sqlite_store;
mod store;
mod types;

pub use json_store::JsonEpisodeStore;
pub use sqlite_store::SqliteEpisodeStore;
pub use store::{EpisodeStore, StoreError, UpsertOutcome};
pub use types::{normalize_external_id, EpisodeId, TrackedEpisode, UNKNOWN_EXTERNAL_ID};
