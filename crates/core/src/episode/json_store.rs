//! JSON-file-backed episode store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{EpisodeId, EpisodeStore, StoreError, TrackedEpisode, UpsertOutcome};

/// Episode store kept as a pretty-printed JSON array in a single file.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so readers only ever see a complete store.
///
/// Records are handled as raw JSON on the write path. An element that does
/// not decode as an episode is skipped by `load` but written back untouched,
/// and still counts as known for `upsert` if it carries an `episode_id`.
#[derive(Debug, Clone)]
pub struct JsonEpisodeStore {
    path: PathBuf,
}

impl JsonEpisodeStore {
    /// Create a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Read the raw records.
    ///
    /// A missing file or a document that is not a JSON array reads as empty.
    /// Any other read failure is returned so callers don't overwrite a file
    /// they could not see.
    fn read_records(&self) -> Result<Vec<Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Episode store not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<Value>>(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Episode store is corrupt, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_records(&self, records: &[Value]) -> Result<(), StoreError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(path = %self.path.display(), count = records.len(), "Saved episode store");
        Ok(())
    }
}

fn record_id(record: &Value) -> Option<EpisodeId> {
    record.get("episode_id")?.as_u64()
}

fn record_downloaded(record: &Value) -> bool {
    record
        .get("downloaded")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

impl EpisodeStore for JsonEpisodeStore {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Vec<TrackedEpisode> {
        let records = self.read_records().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Failed to read episode store, treating as empty");
            Vec::new()
        });

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                serde_json::from_value::<TrackedEpisode>(record)
                    .map_err(|e| {
                        warn!(path = %self.path.display(), index, error = %e, "Skipping invalid episode record");
                    })
                    .ok()
            })
            .collect()
    }

    fn save(&self, episodes: &[TrackedEpisode]) -> Result<(), StoreError> {
        let records = episodes
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.write_records(&records)
    }

    fn upsert(&self, candidate: TrackedEpisode) -> Result<UpsertOutcome, StoreError> {
        let mut records = self.read_records()?;

        if let Some(existing) = records
            .iter()
            .find(|r| record_id(r) == Some(candidate.episode_id))
        {
            return Ok(if record_downloaded(existing) {
                UpsertOutcome::AlreadyDownloaded
            } else {
                UpsertOutcome::AlreadySearching
            });
        }

        records.push(serde_json::to_value(TrackedEpisode {
            downloaded: false,
            ..candidate
        })?);
        self.write_records(&records)?;
        Ok(UpsertOutcome::NewlyTracked)
    }

    fn mark_downloaded(&self, episode_id: EpisodeId) -> Result<bool, StoreError> {
        let mut records = self.read_records()?;

        let Some(record) = records
            .iter_mut()
            .find(|r| record_id(r) == Some(episode_id))
        else {
            return Ok(false);
        };
        if !record_downloaded(record) {
            if let Some(fields) = record.as_object_mut() {
                fields.insert("downloaded".to_string(), Value::Bool(true));
            }
            self.write_records(&records)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn episode(id: u64) -> TrackedEpisode {
        TrackedEpisode {
            episode_id: id,
            show_title: "Slow Horses".to_string(),
            season: 4,
            episode: id as u32,
            external_id: Some("tt5875444".to_string()),
            air_date_utc: Utc.with_ymd_and_hms(2024, 9, 4, 1, 0, 0).unwrap(),
            quality_profile_id: 6,
            downloaded: false,
        }
    }

    fn store_in(dir: &TempDir) -> JsonEpisodeStore {
        JsonEpisodeStore::new(dir.path().join("data.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn test_load_invalid_json_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"episode_id": 1}"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let episodes = vec![episode(3), episode(1), episode(2)];

        store.save(&episodes).unwrap();

        assert_eq!(store.load(), episodes);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonEpisodeStore::new(dir.path().join("nested/state/data.json"));
        store.save(&[episode(1)]).unwrap();
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_upsert_persists_new_episode() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.upsert(episode(1)).unwrap(), UpsertOutcome::NewlyTracked);

        let reopened = store_in(&dir);
        assert_eq!(reopened.load().len(), 1);
    }

    #[test]
    fn test_upsert_twice_keeps_one_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.upsert(episode(1)).unwrap();
        assert_eq!(
            store.upsert(episode(1)).unwrap(),
            UpsertOutcome::AlreadySearching
        );
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_mark_downloaded_is_monotonic() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.upsert(episode(1)).unwrap();

        assert!(store.mark_downloaded(1).unwrap());
        assert_eq!(
            store.upsert(episode(1)).unwrap(),
            UpsertOutcome::AlreadyDownloaded
        );
        assert!(store.mark_downloaded(1).unwrap());

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].downloaded);
    }

    #[test]
    fn test_mark_downloaded_unknown_id_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.upsert(episode(1)).unwrap();

        assert!(!store.mark_downloaded(99).unwrap());
        assert!(!store.load()[0].downloaded);
    }

    #[test]
    fn test_list_pending_skips_downloaded_and_unknown_ids() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&[
                episode(1),
                TrackedEpisode {
                    downloaded: true,
                    ..episode(2)
                },
                TrackedEpisode {
                    external_id: None,
                    ..episode(3)
                },
                episode(4),
            ])
            .unwrap();

        let ids: Vec<u64> = store.list_pending().iter().map(|e| e.episode_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_upsert_forces_downloaded_false_on_insert() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .upsert(TrackedEpisode {
                downloaded: true,
                ..episode(1)
            })
            .unwrap();
        assert!(!store.load()[0].downloaded);
    }

    fn write_with_invalid_record(store: &JsonEpisodeStore) {
        let downloaded = serde_json::to_value(TrackedEpisode {
            downloaded: true,
            ..episode(1)
        })
        .unwrap();
        let invalid = serde_json::json!({ "episode_id": 2, "show_title": "Slow Horses" });
        let pending = serde_json::to_value(episode(3)).unwrap();
        fs::write(
            store.path(),
            serde_json::to_string(&vec![downloaded, invalid, pending]).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_load_skips_invalid_records() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_with_invalid_record(&store);

        let loaded = store.load();
        let ids: Vec<u64> = loaded.iter().map(|e| e.episode_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(loaded[0].downloaded);
    }

    #[test]
    fn test_invalid_record_does_not_reset_downloaded_flags() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_with_invalid_record(&store);

        assert_eq!(
            store.upsert(episode(1)).unwrap(),
            UpsertOutcome::AlreadyDownloaded
        );
        assert_eq!(store.upsert(episode(4)).unwrap(), UpsertOutcome::NewlyTracked);
        assert!(store.mark_downloaded(3).unwrap());

        let loaded = store.load();
        let downloaded: Vec<u64> = loaded
            .iter()
            .filter(|e| e.downloaded)
            .map(|e| e.episode_id)
            .collect();
        assert_eq!(downloaded, vec![1, 3]);

        let raw: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(record_id(&raw[1]), Some(2));
    }

    #[test]
    fn test_invalid_record_id_still_counts_as_known() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_with_invalid_record(&store);

        assert_eq!(
            store.upsert(episode(2)).unwrap(),
            UpsertOutcome::AlreadySearching
        );
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn test_unreadable_store_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        // A directory at the store path can't be read as a file.
        let store = JsonEpisodeStore::new(dir.path());

        assert!(store.load().is_empty());
        assert!(matches!(
            store.upsert(episode(1)).unwrap_err(),
            StoreError::Io(_)
        ));
        assert!(matches!(
            store.mark_downloaded(1).unwrap_err(),
            StoreError::Io(_)
        ));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_corrupt_store_is_replaced_on_next_upsert() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "garbage").unwrap();

        assert_eq!(store.upsert(episode(5)).unwrap(), UpsertOutcome::NewlyTracked);
        assert_eq!(store.load().len(), 1);
    }
}
