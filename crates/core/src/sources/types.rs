//! Types for the collaborator boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::episode::{EpisodeId, TrackedEpisode};
use crate::selection::{QualityPolicy, ReleaseCandidate};

/// One entry of the series manager's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Id of the show the episode belongs to.
    pub series_id: u64,
    /// Reference used to fetch the episode details.
    pub episode_ref: EpisodeId,
}

/// Validated episode details from the series manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeDetails {
    pub episode_id: EpisodeId,
    pub show_title: String,
    pub season: u32,
    pub episode: u32,
    pub air_date_utc: DateTime<Utc>,
    /// `None` when the series manager knows no external id.
    pub external_id: Option<String>,
    pub quality_profile_id: u64,
}

impl EpisodeDetails {
    pub fn has_aired(&self, now: DateTime<Utc>) -> bool {
        self.air_date_utc <= now
    }

    /// The store record for this episode, not yet downloaded.
    pub fn into_tracked(self) -> TrackedEpisode {
        TrackedEpisode {
            episode_id: self.episode_id,
            show_title: self.show_title,
            season: self.season,
            episode: self.episode,
            external_id: self.external_id,
            air_date_utc: self.air_date_utc,
            quality_profile_id: self.quality_profile_id,
            downloaded: false,
        }
    }
}

/// Acknowledgment returned by the debrid service for a submitted release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadAck {
    /// Debrid-side id of the added torrent.
    pub id: String,
}

/// Errors from the series manager.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Missing field in series data: {0}")]
    MissingField(String),

    #[error("Series manager connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Series manager request timeout")]
    Timeout,

    #[error("Series manager API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse series manager response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_connect() {
            LookupError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            LookupError::ParseError(e.to_string())
        } else {
            LookupError::ConnectionFailed(e.to_string())
        }
    }
}

/// Errors from the torrent indexer.
#[derive(Debug, Error)]
pub enum CandidateSourceError {
    #[error("Indexer connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Indexer request timeout")]
    Timeout,

    #[error("Indexer API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse indexer response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for CandidateSourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CandidateSourceError::Timeout
        } else if e.is_decode() {
            CandidateSourceError::ParseError(e.to_string())
        } else {
            CandidateSourceError::ConnectionFailed(e.to_string())
        }
    }
}

/// Errors from the debrid service.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Debrid connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Debrid request timeout")]
    Timeout,

    #[error("Debrid API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse debrid response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DownloadError::Timeout
        } else if e.is_decode() {
            DownloadError::ParseError(e.to_string())
        } else {
            DownloadError::ConnectionFailed(e.to_string())
        }
    }
}

/// Errors from the media server.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Media server connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Media server request timeout")]
    Timeout,

    #[error("Media server API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NotifyError::Timeout
        } else {
            NotifyError::ConnectionFailed(e.to_string())
        }
    }
}

/// Series manager: calendar, episode details and quality profiles.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Episodes on the calendar.
    async fn list_upcoming(&self) -> Result<Vec<CalendarEntry>, LookupError>;

    /// Full details for one calendar entry.
    async fn get_episode(&self, entry: &CalendarEntry) -> Result<EpisodeDetails, LookupError>;

    /// A show's quality policy.
    async fn get_quality_policy(&self, policy_id: u64) -> Result<QualityPolicy, LookupError>;
}

/// Torrent indexer.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Release candidates for one episode.
    async fn search(
        &self,
        external_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Vec<ReleaseCandidate>, CandidateSourceError>;
}

/// Debrid service that fetches a chosen release.
#[async_trait]
pub trait DownloadInitiator: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Hand a release to the service.
    async fn submit(&self, candidate: &ReleaseCandidate) -> Result<DownloadAck, DownloadError>;
}

/// Media server that rescans its library.
#[async_trait]
pub trait LibraryNotifier: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Ask the media server to rescan.
    async fn refresh(&self) -> Result<(), NotifyError>;
}

/// Notifier used when no media server is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl LibraryNotifier for NoopNotifier {
    fn name(&self) -> &str {
        "none"
    }

    async fn refresh(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn details() -> EpisodeDetails {
        EpisodeDetails {
            episode_id: 11,
            show_title: "Andor".to_string(),
            season: 2,
            episode: 1,
            air_date_utc: Utc.with_ymd_and_hms(2025, 4, 22, 1, 0, 0).unwrap(),
            external_id: Some("tt9253284".to_string()),
            quality_profile_id: 4,
        }
    }

    #[test]
    fn test_into_tracked_starts_not_downloaded() {
        let tracked = details().into_tracked();
        assert_eq!(tracked.episode_id, 11);
        assert_eq!(tracked.external_id.as_deref(), Some("tt9253284"));
        assert!(!tracked.downloaded);
    }

    #[test]
    fn test_has_aired() {
        let d = details();
        assert!(d.has_aired(d.air_date_utc + Duration::hours(1)));
        assert!(!d.has_aired(d.air_date_utc - Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_noop_notifier() {
        assert!(NoopNotifier.refresh().await.is_ok());
        assert_eq!(NoopNotifier.name(), "none");
    }
}
