//! Quality policy resolution into search terms.

use std::collections::BTreeSet;

use super::QualityPolicy;

/// Split a compound quality name such as `"Bluray-1080p Remux"` into its
/// independent signals: first on `-`, then on whitespace.
pub fn tokenize_quality_name(name: &str) -> impl Iterator<Item = &str> {
    name.split('-').flat_map(str::split_whitespace)
}

/// Flat set of tokens describing what the policy accepts.
///
/// Only allowed buckets contribute. Case is preserved; matching against
/// titles is case-insensitive.
pub fn resolve_terms(policy: &QualityPolicy) -> BTreeSet<String> {
    policy
        .buckets
        .iter()
        .filter(|bucket| bucket.allowed)
        .flat_map(|bucket| bucket.quality_names())
        .flat_map(tokenize_quality_name)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::QualityBucket;

    fn policy(buckets: Vec<QualityBucket>) -> QualityPolicy {
        QualityPolicy {
            id: 1,
            name: "HD-1080p".to_string(),
            buckets,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_quality_name() {
        let tokens: Vec<&str> = tokenize_quality_name("Bluray-1080p Remux").collect();
        assert_eq!(tokens, vec!["Bluray", "1080p", "Remux"]);

        let tokens: Vec<&str> = tokenize_quality_name("WEBDL-2160p").collect();
        assert_eq!(tokens, vec!["WEBDL", "2160p"]);
    }

    #[test]
    fn test_tokenize_drops_empty_pieces() {
        let tokens: Vec<&str> = tokenize_quality_name(" Raw-HD - ").collect();
        assert_eq!(tokens, vec!["Raw", "HD"]);
    }

    #[test]
    fn test_resolve_terms_only_allowed_buckets() {
        let terms = resolve_terms(&policy(vec![
            QualityBucket::single("HDTV-720p", false),
            QualityBucket::single("WEBDL-1080p", true),
            QualityBucket::single("Bluray-2160p", false),
        ]));
        assert_eq!(terms, set(&["WEBDL", "1080p"]));
    }

    #[test]
    fn test_resolve_terms_expands_groups() {
        let terms = resolve_terms(&policy(vec![
            QualityBucket::group(
                "WEB 1080p",
                true,
                vec!["WEBDL-1080p".to_string(), "WEBRip-1080p".to_string()],
            ),
            QualityBucket::single("Bluray-1080p Remux", true),
        ]));
        assert_eq!(
            terms,
            set(&["WEBDL", "WEBRip", "1080p", "Bluray", "Remux"])
        );
        assert!(!terms.contains("WEB"));
    }

    #[test]
    fn test_resolve_terms_nothing_allowed() {
        let terms = resolve_terms(&policy(vec![QualityBucket::single("SDTV", false)]));
        assert!(terms.is_empty());
    }
}
