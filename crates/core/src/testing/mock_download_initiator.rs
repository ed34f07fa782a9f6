//! Mock debrid service for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::selection::ReleaseCandidate;
use crate::sources::{DownloadAck, DownloadError, DownloadInitiator};

/// Mock implementation of the DownloadInitiator trait.
///
/// Records every submitted release, including rejected ones. Successful
/// submissions are acknowledged with ids `mock-1`, `mock-2`, ...
#[derive(Debug, Default)]
pub struct MockDownloadInitiator {
    submitted: Arc<RwLock<Vec<ReleaseCandidate>>>,
    accepted: Arc<RwLock<usize>>,
    /// If set, the next submission fails with this error.
    next_error: Arc<RwLock<Option<DownloadError>>>,
}

impl MockDownloadInitiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next submission to fail with the given error.
    pub async fn set_next_error(&self, error: DownloadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Every release handed to `submit`, in call order.
    pub async fn submitted(&self) -> Vec<ReleaseCandidate> {
        self.submitted.read().await.clone()
    }

    /// Number of submissions that were acknowledged.
    pub async fn accepted_count(&self) -> usize {
        *self.accepted.read().await
    }
}

#[async_trait]
impl DownloadInitiator for MockDownloadInitiator {
    fn name(&self) -> &str {
        "mock-debrid"
    }

    async fn submit(&self, candidate: &ReleaseCandidate) -> Result<DownloadAck, DownloadError> {
        self.submitted.write().await.push(candidate.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let mut accepted = self.accepted.write().await;
        *accepted += 1;
        Ok(DownloadAck {
            id: format!("mock-{}", *accepted),
        })
    }
}
