pub mod config;
pub mod driver;
pub mod episode;
pub mod jellyfin;
pub mod metrics;
pub mod real_debrid;
pub mod selection;
pub mod sonarr;
pub mod sources;
pub mod testing;
pub mod torrentio;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    StoreBackend,
};
pub use driver::{AcquisitionDriver, PassReport};
pub use episode::{
    EpisodeStore, JsonEpisodeStore, SqliteEpisodeStore, StoreError, TrackedEpisode, UpsertOutcome,
};
pub use jellyfin::JellyfinClient;
pub use real_debrid::RealDebridClient;
pub use selection::{rank, resolve_terms, QualityPolicy, ReleaseCandidate, ReleaseFilter};
pub use sonarr::SonarrClient;
pub use sources::{
    CandidateSource, DownloadInitiator, LibraryNotifier, NoopNotifier, SeriesSource,
};
pub use torrentio::TorrentioClient;
