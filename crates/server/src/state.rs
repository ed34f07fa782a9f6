use std::sync::Arc;

use tokio::sync::RwLock;

use airtime_core::{Config, EpisodeStore, PassReport, SanitizedConfig, TrackedEpisode};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn EpisodeStore>,
    last_report: RwLock<Option<PassReport>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn EpisodeStore>) -> Self {
        Self {
            config,
            store,
            last_report: RwLock::new(None),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn episodes(&self) -> Vec<TrackedEpisode> {
        self.store.load()
    }

    pub async fn last_report(&self) -> Option<PassReport> {
        self.last_report.read().await.clone()
    }

    pub async fn set_last_report(&self, report: PassReport) {
        *self.last_report.write().await = Some(report);
    }
}
