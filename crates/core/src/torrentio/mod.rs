//! Torrentio addon client.
//!
//! Torrentio returns per-episode streams whose `title` embeds the release
//! name, seeder count, size and language flags.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TorrentioConfig;
use crate::selection::ReleaseCandidate;
use crate::sources::{CandidateSource, CandidateSourceError};

/// Torrentio API response
#[derive(Debug, Deserialize)]
struct TorrentioResponse {
    #[serde(default)]
    streams: Vec<TorrentioStream>,
}

/// Individual stream from Torrentio
#[derive(Debug, Deserialize)]
struct TorrentioStream {
    #[serde(default)]
    title: String,
    #[serde(rename = "infoHash")]
    info_hash: Option<String>,
}

impl TorrentioStream {
    fn into_candidate(self) -> Option<ReleaseCandidate> {
        let info_hash = self.info_hash.filter(|h| !h.is_empty())?;
        Some(ReleaseCandidate::new(self.title, info_hash.to_lowercase()))
    }
}

/// Torrentio addon client
pub struct TorrentioClient {
    client: Client,
    config: TorrentioConfig,
}

impl TorrentioClient {
    pub fn new(config: TorrentioConfig) -> Result<Self, CandidateSourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self { client, config })
    }

    /// Stream URL for one episode.
    fn episode_url(&self, external_id: &str, season: u32, episode: u32) -> String {
        let base = self.config.url.trim_end_matches('/');
        let options = self.config.options.trim_matches('/').replace('|', "%7C");
        let resource = format!(
            "stream/series/{}:{}:{}.json",
            urlencoding::encode(external_id),
            season,
            episode
        );

        if options.is_empty() {
            format!("{}/{}", base, resource)
        } else {
            format!("{}/{}/{}", base, options, resource)
        }
    }
}

fn parse_streams(body: &str) -> Result<Vec<ReleaseCandidate>, CandidateSourceError> {
    let response: TorrentioResponse = serde_json::from_str(body)
        .map_err(|e| CandidateSourceError::ParseError(e.to_string()))?;

    Ok(response
        .streams
        .into_iter()
        .filter_map(TorrentioStream::into_candidate)
        .collect())
}

#[async_trait]
impl CandidateSource for TorrentioClient {
    fn name(&self) -> &str {
        "torrentio"
    }

    async fn search(
        &self,
        external_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Vec<ReleaseCandidate>, CandidateSourceError> {
        let url = self.episode_url(external_id, season, episode);
        debug!(url = %url, "Torrentio request");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CandidateSourceError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        parse_streams(&body)
    }
}
