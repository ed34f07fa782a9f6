//! Types for release selection.

use serde::{Deserialize, Serialize};

/// A release option returned by the torrent indexer for one episode.
///
/// The title is free text that embeds the seeder count and the
/// quality/language markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    pub title: String,
    /// Info hash (hex), used to build the magnet link.
    pub info_hash: String,
}

impl ReleaseCandidate {
    pub fn new(title: impl Into<String>, info_hash: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            info_hash: info_hash.into(),
        }
    }

    /// Magnet URI for this release.
    pub fn magnet_uri(&self) -> String {
        format!("magnet:?xt=urn:btih:{}", self.info_hash)
    }
}

/// A show's quality profile: an ordered list of buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityPolicy {
    pub id: u64,
    pub name: String,
    pub buckets: Vec<QualityBucket>,
}

/// One allow/disallow unit of a quality policy.
///
/// A bucket either names a single quality or groups several sub-qualities
/// under its own (display) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityBucket {
    pub name: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_qualities: Vec<String>,
}

impl QualityBucket {
    /// A bucket naming a single quality.
    pub fn single(name: impl Into<String>, allowed: bool) -> Self {
        Self {
            name: name.into(),
            allowed,
            sub_qualities: Vec::new(),
        }
    }

    /// A bucket grouping several sub-qualities.
    pub fn group(name: impl Into<String>, allowed: bool, sub_qualities: Vec<String>) -> Self {
        Self {
            name: name.into(),
            allowed,
            sub_qualities,
        }
    }

    /// Quality names this bucket stands for.
    pub fn quality_names(&self) -> Vec<&str> {
        if self.sub_qualities.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.sub_qualities.iter().map(String::as_str).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnet_uri() {
        let candidate = ReleaseCandidate::new("torrent", "12345");
        assert_eq!(candidate.magnet_uri(), "magnet:?xt=urn:btih:12345");
    }

    #[test]
    fn test_quality_names_single() {
        let bucket = QualityBucket::single("HDTV-720p", true);
        assert_eq!(bucket.quality_names(), vec!["HDTV-720p"]);
    }

    #[test]
    fn test_quality_names_group_ignores_group_name() {
        let bucket = QualityBucket::group(
            "WEB 1080p",
            true,
            vec!["WEBDL-1080p".to_string(), "WEBRip-1080p".to_string()],
        );
        assert_eq!(bucket.quality_names(), vec!["WEBDL-1080p", "WEBRip-1080p"]);
    }
}
