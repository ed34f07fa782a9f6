//! Sonarr v3 API payloads and their validation into core types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::episode::normalize_external_id;
use crate::selection::{QualityBucket, QualityPolicy};
use crate::sources::{CalendarEntry, EpisodeDetails, LookupError};

/// `GET /api/v3/calendar` item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarItem {
    pub id: Option<u64>,
    #[serde(default)]
    pub series_id: u64,
}

impl CalendarItem {
    pub fn into_entry(self) -> Option<CalendarEntry> {
        self.id.map(|episode_ref| CalendarEntry {
            series_id: self.series_id,
            episode_ref,
        })
    }
}

/// `GET /api/v3/episode/{id}` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EpisodeResource {
    pub id: Option<u64>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub air_date_utc: Option<DateTime<Utc>>,
    pub series: Option<SeriesResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeriesResource {
    pub title: Option<String>,
    pub imdb_id: Option<String>,
    pub quality_profile_id: Option<u64>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, LookupError> {
    value.ok_or_else(|| LookupError::MissingField(field.to_string()))
}

impl TryFrom<EpisodeResource> for EpisodeDetails {
    type Error = LookupError;

    fn try_from(raw: EpisodeResource) -> Result<Self, Self::Error> {
        let series = required(raw.series, "series")?;
        Ok(EpisodeDetails {
            episode_id: required(raw.id, "id")?,
            show_title: required(series.title, "series.title")?,
            season: required(raw.season_number, "seasonNumber")?,
            episode: required(raw.episode_number, "episodeNumber")?,
            air_date_utc: required(raw.air_date_utc, "airDateUtc")?,
            external_id: normalize_external_id(series.imdb_id.as_deref()),
            quality_profile_id: required(series.quality_profile_id, "series.qualityProfileId")?,
        })
    }
}

/// `GET /api/v3/qualityprofile/{id}` response.
#[derive(Debug, Deserialize)]
pub(crate) struct QualityProfileResource {
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<QualityProfileItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QualityProfileItem {
    pub name: Option<String>,
    pub quality: Option<QualityResource>,
    #[serde(default)]
    pub items: Vec<QualityProfileItem>,
    #[serde(default)]
    pub allowed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QualityResource {
    pub name: Option<String>,
}

impl QualityProfileItem {
    /// Group name if present, otherwise the wrapped quality's name.
    fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.quality.as_ref().and_then(|q| q.name.as_deref()))
    }

    fn collect_leaf_names(&self, out: &mut Vec<String>) -> Result<(), LookupError> {
        if self.items.is_empty() {
            let name = required(self.display_name(), "items[].quality.name")?;
            out.push(name.to_string());
        } else {
            for item in &self.items {
                item.collect_leaf_names(out)?;
            }
        }
        Ok(())
    }

    fn into_bucket(self) -> Result<QualityBucket, LookupError> {
        let name = required(self.display_name(), "items[].name")?.to_string();
        if self.items.is_empty() {
            return Ok(QualityBucket::single(name, self.allowed));
        }
        let mut sub_qualities = Vec::new();
        for item in &self.items {
            item.collect_leaf_names(&mut sub_qualities)?;
        }
        Ok(QualityBucket::group(name, self.allowed, sub_qualities))
    }
}

impl TryFrom<QualityProfileResource> for QualityPolicy {
    type Error = LookupError;

    fn try_from(raw: QualityProfileResource) -> Result<Self, Self::Error> {
        Ok(QualityPolicy {
            id: required(raw.id, "id")?,
            name: raw.name,
            buckets: raw
                .items
                .into_iter()
                .map(QualityProfileItem::into_bucket)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::resolve_terms;

    const EPISODE_JSON: &str = r#"{
        "seriesId": 12,
        "id": 345,
        "seasonNumber": 1,
        "episodeNumber": 4,
        "title": "Who Is Alexa?",
        "airDateUtc": "2024-04-11T04:00:00Z",
        "hasFile": false,
        "series": {
            "title": "Fallout",
            "imdbId": "tt12637874",
            "qualityProfileId": 6
        }
    }"#;

    #[test]
    fn test_episode_conversion() {
        let raw: EpisodeResource = serde_json::from_str(EPISODE_JSON).unwrap();
        let details = EpisodeDetails::try_from(raw).unwrap();
        assert_eq!(details.episode_id, 345);
        assert_eq!(details.show_title, "Fallout");
        assert_eq!(details.season, 1);
        assert_eq!(details.episode, 4);
        assert_eq!(details.external_id.as_deref(), Some("tt12637874"));
        assert_eq!(details.quality_profile_id, 6);
        assert_eq!(details.air_date_utc.to_rfc3339(), "2024-04-11T04:00:00+00:00");
    }

    #[test]
    fn test_episode_without_imdb_id_is_unknown() {
        let json = r#"{
            "id": 1, "seasonNumber": 1, "episodeNumber": 1,
            "airDateUtc": "2024-04-11T04:00:00Z",
            "series": {"title": "Obscure Show", "qualityProfileId": 1}
        }"#;
        let raw: EpisodeResource = serde_json::from_str(json).unwrap();
        let details = EpisodeDetails::try_from(raw).unwrap();
        assert!(details.external_id.is_none());
    }

    #[test]
    fn test_episode_missing_field() {
        let json = r#"{
            "id": 1, "seasonNumber": 1,
            "airDateUtc": "2024-04-11T04:00:00Z",
            "series": {"title": "Fallout", "qualityProfileId": 1}
        }"#;
        let raw: EpisodeResource = serde_json::from_str(json).unwrap();
        let err = EpisodeDetails::try_from(raw).unwrap_err();
        assert!(matches!(err, LookupError::MissingField(f) if f == "episodeNumber"));
    }

    #[test]
    fn test_episode_missing_series() {
        let json = r#"{"id": 1, "seasonNumber": 1, "episodeNumber": 1, "airDateUtc": "2024-04-11T04:00:00Z"}"#;
        let raw: EpisodeResource = serde_json::from_str(json).unwrap();
        let err = EpisodeDetails::try_from(raw).unwrap_err();
        assert!(matches!(err, LookupError::MissingField(f) if f == "series"));
    }

    #[test]
    fn test_calendar_item_without_id_is_dropped() {
        let items: Vec<CalendarItem> =
            serde_json::from_str(r#"[{"id": 5, "seriesId": 2}, {"seriesId": 3}]"#).unwrap();
        let entries: Vec<CalendarEntry> =
            items.into_iter().filter_map(CalendarItem::into_entry).collect();
        assert_eq!(
            entries,
            vec![CalendarEntry {
                series_id: 2,
                episode_ref: 5
            }]
        );
    }

    #[test]
    fn test_quality_profile_conversion() {
        let json = r#"{
            "id": 6,
            "name": "HD-1080p",
            "upgradeAllowed": true,
            "items": [
                {"quality": {"id": 1, "name": "SDTV", "source": "television", "resolution": 480}, "items": [], "allowed": false},
                {"quality": {"id": 9, "name": "HDTV-1080p"}, "items": [], "allowed": true},
                {
                    "name": "WEB 1080p",
                    "items": [
                        {"quality": {"id": 3, "name": "WEBDL-1080p"}, "items": [], "allowed": true},
                        {"quality": {"id": 15, "name": "WEBRip-1080p"}, "items": [], "allowed": true}
                    ],
                    "allowed": true,
                    "id": 1002
                },
                {"quality": {"id": 7, "name": "Bluray-1080p"}, "items": [], "allowed": false}
            ]
        }"#;
        let raw: QualityProfileResource = serde_json::from_str(json).unwrap();
        let policy = QualityPolicy::try_from(raw).unwrap();

        assert_eq!(policy.id, 6);
        assert_eq!(policy.buckets.len(), 4);
        assert_eq!(
            policy.buckets[2].sub_qualities,
            vec!["WEBDL-1080p".to_string(), "WEBRip-1080p".to_string()]
        );

        let terms: Vec<String> = resolve_terms(&policy).into_iter().collect();
        assert_eq!(terms, vec!["1080p", "HDTV", "WEBDL", "WEBRip"]);
    }

    #[test]
    fn test_quality_profile_item_without_name() {
        let json = r#"{"id": 1, "name": "Broken", "items": [{"items": [], "allowed": true}]}"#;
        let raw: QualityProfileResource = serde_json::from_str(json).unwrap();
        assert!(matches!(
            QualityPolicy::try_from(raw),
            Err(LookupError::MissingField(_))
        ));
    }
}
