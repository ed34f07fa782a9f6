//! Sonarr HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::SonarrConfig;
use crate::selection::QualityPolicy;
use crate::sources::{CalendarEntry, EpisodeDetails, LookupError, SeriesSource};

use super::payloads::{CalendarItem, EpisodeResource, QualityProfileResource};

/// Sonarr API client.
pub struct SonarrClient {
    client: Client,
    config: SonarrConfig,
}

impl SonarrClient {
    /// Create a new Sonarr client.
    pub fn new(config: SonarrConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, LookupError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        debug!(endpoint, "Sonarr request");

        let response = self
            .client
            .get(&url)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl SeriesSource for SonarrClient {
    fn name(&self) -> &str {
        "sonarr"
    }

    async fn list_upcoming(&self) -> Result<Vec<CalendarEntry>, LookupError> {
        let items: Vec<CalendarItem> = self.get_json("/api/v3/calendar").await?;
        let total = items.len();

        let entries: Vec<CalendarEntry> = items
            .into_iter()
            .filter_map(CalendarItem::into_entry)
            .collect();

        if entries.len() < total {
            warn!(
                dropped = total - entries.len(),
                "Ignoring calendar entries without an episode id"
            );
        }
        Ok(entries)
    }

    async fn get_episode(&self, entry: &CalendarEntry) -> Result<EpisodeDetails, LookupError> {
        let raw: EpisodeResource = self
            .get_json(&format!("/api/v3/episode/{}", entry.episode_ref))
            .await?;
        EpisodeDetails::try_from(raw)
    }

    async fn get_quality_policy(&self, policy_id: u64) -> Result<QualityPolicy, LookupError> {
        let raw: QualityProfileResource = self
            .get_json(&format!("/api/v3/qualityprofile/{}", policy_id))
            .await?;
        QualityPolicy::try_from(raw)
    }
}
