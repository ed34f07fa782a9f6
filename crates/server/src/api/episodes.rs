//! Episode ledger and pass status endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use airtime_core::{PassReport, TrackedEpisode};

use crate::state::AppState;

/// Query parameters for listing episodes.
#[derive(Debug, Default, Deserialize)]
pub struct ListEpisodesQuery {
    /// Only episodes still being searched for.
    #[serde(default)]
    pub pending: bool,
}

/// Response for listing episodes.
#[derive(Debug, Serialize)]
pub struct EpisodeListResponse {
    pub episodes: Vec<TrackedEpisode>,
    pub total: usize,
    pub downloaded: usize,
}

/// List tracked episodes in store order.
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEpisodesQuery>,
) -> Json<EpisodeListResponse> {
    let all = state.episodes();
    let downloaded = all.iter().filter(|e| e.downloaded).count();
    let total = all.len();

    let episodes = if query.pending {
        all.into_iter().filter(|e| e.is_pending()).collect()
    } else {
        all
    };

    Json(EpisodeListResponse {
        episodes,
        total,
        downloaded,
    })
}

/// Response for the scheduler status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// `None` until the first pass completes.
    pub last_pass: Option<PassReport>,
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        last_pass: state.last_report().await,
    })
}
