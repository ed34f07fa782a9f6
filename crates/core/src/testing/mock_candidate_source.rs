//! Mock torrent indexer for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::selection::ReleaseCandidate;
use crate::sources::{CandidateSource, CandidateSourceError};

/// A recorded search for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub external_id: String,
    pub season: u32,
    pub episode: u32,
}

/// Mock implementation of the CandidateSource trait.
///
/// Returns the default results for every search unless results were set for
/// that exact episode. Ids registered with [`MockCandidateSource::fail_for`]
/// always fail with a connection error.
#[derive(Debug, Default)]
pub struct MockCandidateSource {
    results: Arc<RwLock<Vec<ReleaseCandidate>>>,
    per_episode: Arc<RwLock<HashMap<(String, u32, u32), Vec<ReleaseCandidate>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search fails with this error.
    next_error: Arc<RwLock<Option<CandidateSourceError>>>,
}

impl MockCandidateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the results returned for any episode without specific results.
    pub async fn set_results(&self, results: Vec<ReleaseCandidate>) {
        *self.results.write().await = results;
    }

    /// Set the results returned for one episode.
    pub async fn set_results_for(
        &self,
        external_id: &str,
        season: u32,
        episode: u32,
        results: Vec<ReleaseCandidate>,
    ) {
        self.per_episode
            .write()
            .await
            .insert((external_id.to_string(), season, episode), results);
    }

    /// Make every search for `external_id` fail.
    pub async fn fail_for(&self, external_id: &str) {
        self.failing.write().await.insert(external_id.to_string());
    }

    /// Stop failing searches for `external_id`.
    pub async fn recover(&self, external_id: &str) {
        self.failing.write().await.remove(external_id);
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: CandidateSourceError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }
}

#[async_trait]
impl CandidateSource for MockCandidateSource {
    fn name(&self) -> &str {
        "mock-indexer"
    }

    async fn search(
        &self,
        external_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Vec<ReleaseCandidate>, CandidateSourceError> {
        self.searches.write().await.push(RecordedSearch {
            external_id: external_id.to_string(),
            season,
            episode,
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if self.failing.read().await.contains(external_id) {
            return Err(CandidateSourceError::ConnectionFailed(format!(
                "mock failure for {}",
                external_id
            )));
        }

        let key = (external_id.to_string(), season, episode);
        if let Some(results) = self.per_episode.read().await.get(&key) {
            return Ok(results.clone());
        }
        Ok(self.results.read().await.clone())
    }
}
