//! Mock media server for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::sources::{LibraryNotifier, NotifyError};

/// Mock implementation of the LibraryNotifier trait. Counts refresh calls.
#[derive(Debug, Default)]
pub struct MockLibraryNotifier {
    refreshes: Arc<RwLock<usize>>,
    fail: Arc<RwLock<bool>>,
}

impl MockLibraryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every refresh fail (still counted).
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    pub async fn refresh_count(&self) -> usize {
        *self.refreshes.read().await
    }
}

#[async_trait]
impl LibraryNotifier for MockLibraryNotifier {
    fn name(&self) -> &str {
        "mock-library"
    }

    async fn refresh(&self) -> Result<(), NotifyError> {
        *self.refreshes.write().await += 1;
        if *self.fail.read().await {
            return Err(NotifyError::ConnectionFailed("mock failure".to_string()));
        }
        Ok(())
    }
}
