//! Testing utilities and mock collaborators.
//!
//! Every collaborator trait has an in-memory mock here, so a full pass can
//! be driven without a series manager, an indexer, a debrid account or a
//! media server.
//!
//! # Example
//!
//! ```rust,ignore
//! use airtime_core::testing::{fixtures, MockCandidateSource, MockSeriesSource};
//!
//! let series = MockSeriesSource::new();
//! series.add_episode(fixtures::episode_details(1)).await;
//!
//! let indexer = MockCandidateSource::new();
//! indexer.set_results(vec![fixtures::candidate("Show.S01E01.1080p.WEBDL", 12)]).await;
//! ```

mod mock_candidate_source;
mod mock_download_initiator;
mod mock_library_notifier;
mod mock_series_source;

pub use mock_candidate_source::{MockCandidateSource, RecordedSearch};
pub use mock_download_initiator::MockDownloadInitiator;
pub use mock_library_notifier::MockLibraryNotifier;
pub use mock_series_source::MockSeriesSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::episode::{EpisodeId, TrackedEpisode};
    use crate::selection::{QualityBucket, QualityPolicy, ReleaseCandidate, SEEDER_MARKER};
    use crate::sources::EpisodeDetails;

    /// Fixed "current time" for passes.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// IMDb-style id derived from the episode id.
    pub fn external_id(id: EpisodeId) -> String {
        format!("tt{:07}", id)
    }

    /// Details of an episode that aired a day before [`now`], quality profile 1.
    pub fn episode_details(id: EpisodeId) -> EpisodeDetails {
        EpisodeDetails {
            episode_id: id,
            show_title: "Severance".to_string(),
            season: 1,
            episode: id as u32,
            air_date_utc: now() - Duration::days(1),
            external_id: Some(external_id(id)),
            quality_profile_id: 1,
        }
    }

    /// Details of an episode airing a day after [`now`].
    pub fn future_episode_details(id: EpisodeId) -> EpisodeDetails {
        EpisodeDetails {
            air_date_utc: now() + Duration::days(1),
            ..episode_details(id)
        }
    }

    /// A pending store record matching [`episode_details`].
    pub fn tracked_episode(id: EpisodeId) -> TrackedEpisode {
        episode_details(id).into_tracked()
    }

    /// A candidate whose title carries an indexer-style stats line.
    pub fn candidate(name: &str, seeders: u32) -> ReleaseCandidate {
        let title = format!("{}\n{} {} 💾 2.1 GB ⚙️ ThePirateBay", name, SEEDER_MARKER, seeders);
        let hash = name
            .bytes()
            .fold(seeders as u128, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u128));
        ReleaseCandidate::new(title, format!("{:040x}", hash))
    }

    /// A candidate with no seeder count in its title.
    pub fn malformed_candidate(name: &str) -> ReleaseCandidate {
        ReleaseCandidate::new(name, "0".repeat(40))
    }

    /// A policy allowing exactly `allowed`, with a disallowed catch-all bucket.
    pub fn quality_policy(id: u64, allowed: &[&str]) -> QualityPolicy {
        let mut buckets: Vec<QualityBucket> = allowed
            .iter()
            .map(|name| QualityBucket::single(*name, true))
            .collect();
        buckets.push(QualityBucket::single("SDTV-480p", false));

        QualityPolicy {
            id,
            name: format!("profile-{}", id),
            buckets,
        }
    }
}
