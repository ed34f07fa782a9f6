//! Jellyfin library refresh notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::JellyfinConfig;
use crate::sources::{LibraryNotifier, NotifyError};

/// Jellyfin API client.
pub struct JellyfinClient {
    client: Client,
    config: JellyfinConfig,
}

impl JellyfinClient {
    pub fn new(config: JellyfinConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self { client, config })
    }

    fn refresh_url(&self) -> String {
        format!("{}/Library/Refresh", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LibraryNotifier for JellyfinClient {
    fn name(&self) -> &str {
        "jellyfin"
    }

    async fn refresh(&self) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.refresh_url())
            .header("Authorization", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        info!("Jellyfin library refresh requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_url() {
        let client = JellyfinClient::new(JellyfinConfig {
            url: "http://jellyfin:8096/".to_string(),
            api_key: "token".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.refresh_url(), "http://jellyfin:8096/Library/Refresh");
    }
}
