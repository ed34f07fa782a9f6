//! Acquisition driver implementation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::episode::{EpisodeStore, TrackedEpisode, UpsertOutcome};
use crate::metrics;
use crate::selection::{rank, resolve_terms, ReleaseFilter};
use crate::sources::{
    CalendarEntry, CandidateSource, DownloadInitiator, LibraryNotifier, SeriesSource,
};

use super::types::{AcquireOutcome, IngestOutcome, PassReport};

/// Resolved quality terms, keyed by quality profile id. Lives for one pass.
type TermCache = HashMap<u64, BTreeSet<String>>;

/// Drives ingest-then-acquire passes over the episode store.
pub struct AcquisitionDriver {
    store: Arc<dyn EpisodeStore>,
    series: Arc<dyn SeriesSource>,
    indexer: Arc<dyn CandidateSource>,
    downloader: Arc<dyn DownloadInitiator>,
    notifier: Arc<dyn LibraryNotifier>,
    filter: ReleaseFilter,
}

impl AcquisitionDriver {
    pub fn new(
        store: Arc<dyn EpisodeStore>,
        series: Arc<dyn SeriesSource>,
        indexer: Arc<dyn CandidateSource>,
        downloader: Arc<dyn DownloadInitiator>,
        notifier: Arc<dyn LibraryNotifier>,
        filter: ReleaseFilter,
    ) -> Self {
        Self {
            store,
            series,
            indexer,
            downloader,
            notifier,
            filter,
        }
    }

    pub fn store(&self) -> &Arc<dyn EpisodeStore> {
        &self.store
    }

    /// Run one pass against the wall clock.
    pub async fn run_pass(&self) -> PassReport {
        self.run_pass_at(Utc::now()).await
    }

    /// Run one pass, treating `now` as the current time for air-date checks.
    ///
    /// Never fails: every collaborator or store error is logged, counted in
    /// the report and leaves the affected episode eligible for the next pass.
    #[tracing::instrument(skip(self), fields(store = self.store.name()))]
    pub async fn run_pass_at(&self, now: DateTime<Utc>) -> PassReport {
        let timer = metrics::PASS_DURATION.start_timer();
        metrics::PASSES_TOTAL.inc();

        let mut report = PassReport {
            started_at: Some(now),
            ..PassReport::default()
        };

        self.ingest_calendar(now, &mut report).await;
        self.acquire(&mut report).await;

        if report.downloaded > 0 {
            self.signal_refresh(&mut report).await;
        }

        timer.observe_duration();
        info!(
            calendar_entries = report.calendar_entries,
            newly_tracked = report.newly_tracked,
            searched = report.searched,
            downloaded = report.downloaded,
            no_match = report.no_match,
            failed = report.failed,
            "Pass complete"
        );
        report
    }

    /// Fetch the calendar and track every aired episode with a known external id.
    pub async fn ingest_calendar(&self, now: DateTime<Utc>, report: &mut PassReport) {
        let result = self.series.list_upcoming().await;
        metrics::record_external_call(self.series.name(), "list_upcoming", &result);

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                warn!(source = self.series.name(), error = %e, "Calendar fetch failed, sweeping tracked episodes only");
                return;
            }
        };

        report.calendar_ok = true;
        report.calendar_entries = entries.len();
        debug!(count = entries.len(), "Calendar fetched");

        for entry in &entries {
            let outcome = self.ingest_entry(entry, now).await;
            metrics::EPISODES_INGESTED
                .with_label_values(&[outcome.as_str()])
                .inc();
            report.record_ingest(outcome);
        }
    }

    async fn ingest_entry(&self, entry: &CalendarEntry, now: DateTime<Utc>) -> IngestOutcome {
        let result = self.series.get_episode(entry).await;
        metrics::record_external_call(self.series.name(), "get_episode", &result);

        let details = match result {
            Ok(details) => details,
            Err(e) => {
                warn!(
                    series_id = entry.series_id,
                    episode_ref = entry.episode_ref,
                    error = %e,
                    "Skipping calendar entry"
                );
                return IngestOutcome::Skipped;
            }
        };

        if !details.has_aired(now) {
            debug!(
                episode_id = details.episode_id,
                air_date = %details.air_date_utc,
                "Episode has not aired yet"
            );
            return IngestOutcome::NotAired;
        }

        if details.external_id.is_none() {
            info!(
                episode_id = details.episode_id,
                show = %details.show_title,
                "No external id known for episode, not tracking"
            );
            return IngestOutcome::Skipped;
        }

        let episode = details.into_tracked();
        match self.store.upsert(episode.clone()) {
            Ok(outcome) => {
                match outcome {
                    UpsertOutcome::NewlyTracked => info!(episode = %episode, "Tracking episode"),
                    UpsertOutcome::AlreadyDownloaded => {
                        debug!(episode = %episode, "Episode already downloaded")
                    }
                    UpsertOutcome::AlreadySearching => {
                        debug!(episode = %episode, "Episode already being searched for")
                    }
                }
                IngestOutcome::Stored(outcome)
            }
            Err(e) => {
                error!(episode = %episode, error = %e, "Failed to store episode");
                IngestOutcome::Skipped
            }
        }
    }

    /// Sweep every pending episode in store order.
    pub async fn acquire(&self, report: &mut PassReport) {
        let pending = self.store.list_pending();
        debug!(count = pending.len(), "Sweeping pending episodes");

        let mut cache = TermCache::new();
        for episode in &pending {
            let outcome = self.acquire_episode(episode, &mut cache).await;
            metrics::ACQUISITIONS_TOTAL
                .with_label_values(&[outcome.as_str()])
                .inc();
            report.record_acquire(&outcome);
        }
    }

    /// Search, rank, filter and submit for one episode.
    async fn acquire_episode(
        &self,
        episode: &TrackedEpisode,
        cache: &mut TermCache,
    ) -> AcquireOutcome {
        let Some(external_id) = episode.external_id.as_deref() else {
            return AcquireOutcome::NoMatch;
        };

        let result = self
            .indexer
            .search(external_id, episode.season, episode.episode)
            .await;
        metrics::record_external_call(self.indexer.name(), "search", &result);

        let candidates = match result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(episode = %episode, error = %e, "Candidate search failed");
                return AcquireOutcome::SourceError;
            }
        };
        metrics::CANDIDATES_FOUND.observe(candidates.len() as f64);

        let ranked = match rank(candidates) {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!(episode = %episode, error = %e, "Dropping candidate set");
                return AcquireOutcome::Malformed;
            }
        };

        let Some(terms) = self.quality_terms(episode.quality_profile_id, cache).await else {
            return AcquireOutcome::SourceError;
        };

        let Some(best) = self.filter.apply(ranked, terms).into_iter().next() else {
            info!(episode = %episode, "No acceptable release yet");
            return AcquireOutcome::NoMatch;
        };

        let result = self.downloader.submit(&best).await;
        metrics::record_external_call(self.downloader.name(), "submit", &result);

        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                warn!(episode = %episode, release = %best.title, error = %e, "Failed to submit release");
                return AcquireOutcome::SubmitError;
            }
        };

        if let Err(e) = self.store.mark_downloaded(episode.episode_id) {
            error!(episode = %episode, error = %e, "Release submitted but marking downloaded failed");
        }

        info!(episode = %episode, release = %best.title, download_id = %ack.id, "Downloading episode");
        AcquireOutcome::Downloaded(ack)
    }

    /// Resolved terms for a quality profile, looked up at most once per pass.
    async fn quality_terms<'a>(
        &self,
        profile_id: u64,
        cache: &'a mut TermCache,
    ) -> Option<&'a BTreeSet<String>> {
        if !cache.contains_key(&profile_id) {
            let result = self.series.get_quality_policy(profile_id).await;
            metrics::record_external_call(self.series.name(), "get_quality_policy", &result);

            match result {
                Ok(policy) => {
                    let resolved = resolve_terms(&policy);
                    debug!(profile_id, policy = %policy.name, terms = ?resolved, "Resolved quality terms");
                    cache.insert(profile_id, resolved);
                }
                Err(e) => {
                    warn!(profile_id, error = %e, "Quality profile lookup failed");
                    return None;
                }
            }
        }
        cache.get(&profile_id)
    }

    async fn signal_refresh(&self, report: &mut PassReport) {
        report.refresh_signaled = true;
        metrics::LIBRARY_REFRESHES.inc();

        let result = self.notifier.refresh().await;
        metrics::record_external_call(self.notifier.name(), "refresh", &result);

        match result {
            Ok(()) => debug!(notifier = self.notifier.name(), "Library refresh signaled"),
            Err(e) => warn!(notifier = self.notifier.name(), error = %e, "Library refresh failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::SqliteEpisodeStore;
    use crate::testing::{
        fixtures, MockCandidateSource, MockDownloadInitiator, MockLibraryNotifier,
        MockSeriesSource,
    };

    struct Harness {
        store: Arc<SqliteEpisodeStore>,
        series: Arc<MockSeriesSource>,
        indexer: Arc<MockCandidateSource>,
        downloader: Arc<MockDownloadInitiator>,
        notifier: Arc<MockLibraryNotifier>,
        driver: AcquisitionDriver,
    }

    fn harness() -> Harness {
        let store = Arc::new(SqliteEpisodeStore::in_memory().unwrap());
        let series = Arc::new(MockSeriesSource::new());
        let indexer = Arc::new(MockCandidateSource::new());
        let downloader = Arc::new(MockDownloadInitiator::new());
        let notifier = Arc::new(MockLibraryNotifier::new());
        let driver = AcquisitionDriver::new(
            store.clone(),
            series.clone(),
            indexer.clone(),
            downloader.clone(),
            notifier.clone(),
            ReleaseFilter::default(),
        );
        Harness {
            store,
            series,
            indexer,
            downloader,
            notifier,
            driver,
        }
    }

    #[tokio::test]
    async fn test_policy_resolved_once_per_pass() {
        let h = harness();
        h.series.set_policy(fixtures::quality_policy(1, &["WEBDL-1080p"])).await;
        for id in 1..=3 {
            h.store.upsert(fixtures::tracked_episode(id)).unwrap();
        }

        let report = h.driver.run_pass_at(fixtures::now()).await;

        assert_eq!(report.searched, 3);
        assert_eq!(h.series.policy_lookups().await, vec![1]);
        assert_eq!(h.indexer.search_count().await, 3);
    }

    #[tokio::test]
    async fn test_policy_failure_keeps_episode_pending() {
        let h = harness();
        h.store.upsert(fixtures::tracked_episode(1)).unwrap();
        h.indexer
            .set_results(vec![fixtures::candidate("Show.S01E01.1080p.WEBDL", 5)])
            .await;

        let report = h.driver.run_pass_at(fixtures::now()).await;

        assert_eq!(report.failed, 1);
        assert!(h.downloader.submitted().await.is_empty());
        assert_eq!(h.store.list_pending().len(), 1);
    }

    #[tokio::test]
    async fn test_no_refresh_without_downloads() {
        let h = harness();
        h.series.set_policy(fixtures::quality_policy(1, &["WEBDL-1080p"])).await;
        h.store.upsert(fixtures::tracked_episode(1)).unwrap();
        h.indexer
            .set_results(vec![fixtures::candidate("Show.S01E01.720p.HDTV", 5)])
            .await;

        let report = h.driver.run_pass_at(fixtures::now()).await;

        assert_eq!(report.no_match, 1);
        assert!(!report.refresh_signaled);
        assert_eq!(h.notifier.refresh_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_undo_download() {
        let h = harness();
        h.series.set_policy(fixtures::quality_policy(1, &["WEBDL-1080p"])).await;
        h.store.upsert(fixtures::tracked_episode(1)).unwrap();
        h.indexer
            .set_results(vec![fixtures::candidate("Show.S01E01.1080p.WEBDL", 5)])
            .await;
        h.notifier.set_fail(true).await;

        let report = h.driver.run_pass_at(fixtures::now()).await;

        assert_eq!(report.downloaded, 1);
        assert!(report.refresh_signaled);
        assert!(h.store.list_pending().is_empty());
    }
}
