//! Types for the acquisition driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::episode::UpsertOutcome;
use crate::sources::DownloadAck;

/// What happened to one calendar entry during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored(UpsertOutcome),
    /// Air date is still in the future.
    NotAired,
    /// Lookup failed, no external id, or the store write failed.
    Skipped,
}

impl IngestOutcome {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestOutcome::Stored(outcome) => outcome.as_str(),
            IngestOutcome::NotAired => "not_aired",
            IngestOutcome::Skipped => "skipped",
        }
    }
}

/// What happened to one pending episode during the acquisition sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// A release was submitted and the episode marked downloaded.
    Downloaded(DownloadAck),
    /// Nothing survived filtering.
    NoMatch,
    /// A candidate title had no parsable seeder count.
    Malformed,
    /// The indexer or the quality profile lookup failed.
    SourceError,
    /// The debrid service rejected the release.
    SubmitError,
}

impl AcquireOutcome {
    /// Label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquireOutcome::Downloaded(_) => "downloaded",
            AcquireOutcome::NoMatch => "no_match",
            AcquireOutcome::Malformed => "malformed",
            AcquireOutcome::SourceError => "source_error",
            AcquireOutcome::SubmitError => "submit_error",
        }
    }
}

/// Summary of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Clock value the pass ran against.
    pub started_at: Option<DateTime<Utc>>,
    /// Whether the calendar itself could be fetched.
    pub calendar_ok: bool,
    /// Entries returned by the calendar.
    pub calendar_entries: usize,
    pub newly_tracked: usize,
    pub already_tracked: usize,
    pub not_aired: usize,
    /// Entries dropped by a lookup failure, an unknown external id or a store error.
    pub skipped: usize,
    /// Pending episodes searched for.
    pub searched: usize,
    pub downloaded: usize,
    pub no_match: usize,
    /// Episodes that hit a malformed candidate set, a source error or a submit error.
    pub failed: usize,
    /// Whether the media server was asked to refresh.
    pub refresh_signaled: bool,
}

impl PassReport {
    pub(crate) fn record_ingest(&mut self, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Stored(UpsertOutcome::NewlyTracked) => self.newly_tracked += 1,
            IngestOutcome::Stored(_) => self.already_tracked += 1,
            IngestOutcome::NotAired => self.not_aired += 1,
            IngestOutcome::Skipped => self.skipped += 1,
        }
    }

    pub(crate) fn record_acquire(&mut self, outcome: &AcquireOutcome) {
        self.searched += 1;
        match outcome {
            AcquireOutcome::Downloaded(_) => self.downloaded += 1,
            AcquireOutcome::NoMatch => self.no_match += 1,
            AcquireOutcome::Malformed
            | AcquireOutcome::SourceError
            | AcquireOutcome::SubmitError => self.failed += 1,
        }
    }
}
