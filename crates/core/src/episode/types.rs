//! Tracked episode record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque episode identifier, as assigned by the series manager.
pub type EpisodeId = u64;

/// Sentinel the series manager uses for "no IMDb id known".
pub const UNKNOWN_EXTERNAL_ID: &str = "0";

/// An aired episode the acquisition pass is responsible for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEpisode {
    /// Unique episode id (store key).
    pub episode_id: EpisodeId,
    /// Title of the show this episode belongs to.
    pub show_title: String,
    /// Season number.
    pub season: u32,
    /// Episode number within the season.
    pub episode: u32,
    /// External content id (IMDb-style). `None` means unknown and never eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// When the episode aired (UTC).
    pub air_date_utc: DateTime<Utc>,
    /// Quality profile of the show.
    pub quality_profile_id: u64,
    /// Set once a release was handed to the debrid service. Never reverts.
    #[serde(default)]
    pub downloaded: bool,
}

impl TrackedEpisode {
    /// Whether the air date is at or before `now`.
    pub fn has_aired(&self, now: DateTime<Utc>) -> bool {
        self.air_date_utc <= now
    }

    /// Whether the episode can be searched for: known external id, not yet downloaded.
    pub fn is_pending(&self) -> bool {
        !self.downloaded && self.external_id.is_some()
    }
}

impl fmt::Display for TrackedEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Season {} Episode {}",
            self.show_title, self.season, self.episode
        )
    }
}

/// Map the series manager's raw IMDb id onto `Option`, folding the sentinel
/// and blank values into `None`.
pub fn normalize_external_id(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        None | Some("") | Some(UNKNOWN_EXTERNAL_ID) => None,
        Some(id) => Some(id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn episode() -> TrackedEpisode {
        TrackedEpisode {
            episode_id: 7,
            show_title: "Severance".to_string(),
            season: 2,
            episode: 3,
            external_id: Some("tt11280740".to_string()),
            air_date_utc: Utc.with_ymd_and_hms(2025, 1, 31, 2, 0, 0).unwrap(),
            quality_profile_id: 4,
            downloaded: false,
        }
    }

    #[test]
    fn test_has_aired_is_inclusive() {
        let ep = episode();
        assert!(ep.has_aired(ep.air_date_utc));
        assert!(ep.has_aired(ep.air_date_utc + Duration::seconds(1)));
        assert!(!ep.has_aired(ep.air_date_utc - Duration::seconds(1)));
    }

    #[test]
    fn test_is_pending() {
        let mut ep = episode();
        assert!(ep.is_pending());

        ep.external_id = None;
        assert!(!ep.is_pending());

        ep.external_id = Some("tt1".to_string());
        ep.downloaded = true;
        assert!(!ep.is_pending());
    }

    #[test]
    fn test_normalize_external_id() {
        assert_eq!(normalize_external_id(None), None);
        assert_eq!(normalize_external_id(Some("0")), None);
        assert_eq!(normalize_external_id(Some("  ")), None);
        assert_eq!(
            normalize_external_id(Some("tt0944947")),
            Some("tt0944947".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(episode().to_string(), "Severance Season 2 Episode 3");
    }

    #[test]
    fn test_downloaded_defaults_to_false_when_absent() {
        let json = r#"{
            "episode_id": 1,
            "show_title": "Andor",
            "season": 1,
            "episode": 1,
            "external_id": "tt9253284",
            "air_date_utc": "2022-09-21T01:00:00Z",
            "quality_profile_id": 1
        }"#;
        let ep: TrackedEpisode = serde_json::from_str(json).unwrap();
        assert!(!ep.downloaded);
    }
}
