//! Mock series manager for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::episode::EpisodeId;
use crate::selection::QualityPolicy;
use crate::sources::{CalendarEntry, EpisodeDetails, LookupError, SeriesSource};

/// Mock implementation of the SeriesSource trait.
///
/// The calendar lists entries in the order they were added. Entries added
/// with [`MockSeriesSource::add_calendar_entry`] have no details, so looking
/// them up fails with `LookupError::MissingField`, like a show whose payload
/// lacks required fields.
///
/// # Example
///
/// ```rust,ignore
/// use airtime_core::testing::{MockSeriesSource, fixtures};
///
/// let series = MockSeriesSource::new();
/// series.add_episode(fixtures::episode_details(1)).await;
/// series.set_policy(fixtures::quality_policy(1, &["WEBDL-1080p"])).await;
/// ```
#[derive(Debug, Default)]
pub struct MockSeriesSource {
    calendar: Arc<RwLock<Vec<CalendarEntry>>>,
    episodes: Arc<RwLock<HashMap<EpisodeId, EpisodeDetails>>>,
    policies: Arc<RwLock<HashMap<u64, QualityPolicy>>>,
    /// Profile ids looked up, in call order.
    policy_lookups: Arc<RwLock<Vec<u64>>>,
    /// If set, the next calendar fetch fails with this error.
    next_error: Arc<RwLock<Option<LookupError>>>,
}

impl MockSeriesSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an episode to the calendar together with its details.
    pub async fn add_episode(&self, details: EpisodeDetails) {
        self.calendar.write().await.push(CalendarEntry {
            series_id: details.quality_profile_id,
            episode_ref: details.episode_id,
        });
        self.episodes
            .write()
            .await
            .insert(details.episode_id, details);
    }

    /// Add a calendar entry with no details behind it.
    pub async fn add_calendar_entry(&self, entry: CalendarEntry) {
        self.calendar.write().await.push(entry);
    }

    /// Register a quality policy under its own id.
    pub async fn set_policy(&self, policy: QualityPolicy) {
        self.policies.write().await.insert(policy.id, policy);
    }

    /// Configure the next calendar fetch to fail with the given error.
    pub async fn set_next_error(&self, error: LookupError) {
        *self.next_error.write().await = Some(error);
    }

    /// Profile ids passed to `get_quality_policy`, in call order.
    pub async fn policy_lookups(&self) -> Vec<u64> {
        self.policy_lookups.read().await.clone()
    }
}

#[async_trait]
impl SeriesSource for MockSeriesSource {
    fn name(&self) -> &str {
        "mock-series"
    }

    async fn list_upcoming(&self) -> Result<Vec<CalendarEntry>, LookupError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.calendar.read().await.clone())
    }

    async fn get_episode(&self, entry: &CalendarEntry) -> Result<EpisodeDetails, LookupError> {
        self.episodes
            .read()
            .await
            .get(&entry.episode_ref)
            .cloned()
            .ok_or_else(|| LookupError::MissingField("series".to_string()))
    }

    async fn get_quality_policy(&self, policy_id: u64) -> Result<QualityPolicy, LookupError> {
        self.policy_lookups.write().await.push(policy_id);
        self.policies
            .read()
            .await
            .get(&policy_id)
            .cloned()
            .ok_or_else(|| LookupError::ApiError {
                status: 404,
                message: format!("quality profile {} not found", policy_id),
            })
    }
}
