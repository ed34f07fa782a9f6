//! Real-Debrid download initiator.
//!
//! A release is handed over in two steps: add the magnet, then select all of
//! its files so the service starts fetching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RealDebridConfig;
use crate::selection::ReleaseCandidate;
use crate::sources::{DownloadAck, DownloadError, DownloadInitiator};

/// `POST /torrents/addMagnet` response.
#[derive(Debug, Deserialize)]
struct AddMagnetResponse {
    id: String,
}

/// Real-Debrid API client.
pub struct RealDebridClient {
    client: Client,
    config: RealDebridConfig,
}

impl RealDebridClient {
    pub fn new(config: RealDebridConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/rest/1.0{}",
            self.config.url.trim_end_matches('/'),
            path
        )
    }

    async fn post_form(&self, path: &str, form: multipart::Form) -> Result<Response, DownloadError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        Ok(response)
    }

    async fn add_magnet(&self, magnet: String) -> Result<String, DownloadError> {
        let form = multipart::Form::new().text("magnet", magnet);
        let response = self.post_form("/torrents/addMagnet", form).await?;

        let added: AddMagnetResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::ParseError(e.to_string()))?;
        Ok(added.id)
    }

    async fn select_all_files(&self, torrent_id: &str) -> Result<(), DownloadError> {
        let form = multipart::Form::new().text("files", "all");
        self.post_form(
            &format!("/torrents/selectFiles/{}", urlencoding::encode(torrent_id)),
            form,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DownloadInitiator for RealDebridClient {
    fn name(&self) -> &str {
        "real_debrid"
    }

    async fn submit(&self, candidate: &ReleaseCandidate) -> Result<DownloadAck, DownloadError> {
        let magnet = candidate.magnet_uri();
        debug!(magnet = %magnet, "Adding magnet to Real-Debrid");

        let id = self.add_magnet(magnet).await?;
        self.select_all_files(&id).await?;

        info!(torrent_id = %id, "Real-Debrid download started");
        Ok(DownloadAck { id })
    }
}
