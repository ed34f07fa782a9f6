use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sonarr: SonarrConfig,
    pub real_debrid: RealDebridConfig,
    #[serde(default)]
    pub torrentio: TorrentioConfig,
    #[serde(default)]
    pub jellyfin: Option<JellyfinConfig>,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP status server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u32 {
    30
}

/// Episode store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data.json")
}

/// Available episode store backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
}

/// Periodic pass scheduling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Seconds between the start of two passes (default: 600).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Run a pass immediately on startup instead of waiting one interval.
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            run_on_start: true,
        }
    }
}

fn default_interval() -> u64 {
    600
}

/// Sonarr API configuration (calendar, episodes, quality profiles)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SonarrConfig {
    /// Sonarr server URL (e.g., "http://127.0.0.1:8989")
    #[serde(default = "default_sonarr_url")]
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_sonarr_url() -> String {
    "http://127.0.0.1:8989".to_string()
}

/// Torrentio addon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentioConfig {
    #[serde(default = "default_torrentio_url")]
    pub url: String,
    /// Addon options path segment, `|`-separated as Torrentio expects.
    #[serde(default = "default_torrentio_options")]
    pub options: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for TorrentioConfig {
    fn default() -> Self {
        Self {
            url: default_torrentio_url(),
            options: default_torrentio_options(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_torrentio_url() -> String {
    "https://torrentio.strem.fun".to_string()
}

fn default_torrentio_options() -> String {
    "sort=size|qualityfilter=other,scr,cam,unknown".to_string()
}

/// Real-Debrid API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RealDebridConfig {
    #[serde(default = "default_real_debrid_url")]
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_real_debrid_url() -> String {
    "https://api.real-debrid.com".to_string()
}

/// Jellyfin library refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JellyfinConfig {
    /// Jellyfin server URL (e.g., "http://127.0.0.1:8096")
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Release filter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Substrings that disqualify a release title (case-sensitive).
    #[serde(default)]
    pub banned_words: Vec<String>,
    /// When false, any release with "HDR" in its title is dropped.
    #[serde(default = "default_true")]
    pub hdr_enabled: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            banned_words: Vec::new(),
            hdr_enabled: true,
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub sonarr: SanitizedEndpoint,
    pub real_debrid: SanitizedEndpoint,
    pub torrentio: TorrentioConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jellyfin: Option<SanitizedEndpoint>,
    pub filter: FilterConfig,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
    pub server: ServerConfig,
}

/// An API endpoint with its key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEndpoint {
    pub url: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            sonarr: SanitizedEndpoint {
                url: config.sonarr.url.clone(),
                api_key_configured: !config.sonarr.api_key.is_empty(),
            },
            real_debrid: SanitizedEndpoint {
                url: config.real_debrid.url.clone(),
                api_key_configured: !config.real_debrid.api_key.is_empty(),
            },
            torrentio: config.torrentio.clone(),
            jellyfin: config.jellyfin.as_ref().map(|j| SanitizedEndpoint {
                url: j.url.clone(),
                api_key_configured: !j.api_key.is_empty(),
            }),
            filter: config.filter.clone(),
            store: config.store.clone(),
            scheduler: config.scheduler.clone(),
            server: config.server.clone(),
        }
    }
}
