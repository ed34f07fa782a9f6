//! Release filter stages.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::FilterConfig;

use super::ReleaseCandidate;

/// A title must contain at least this many distinct resolved terms.
pub const MIN_TERM_MATCHES: usize = 2;

const HDR_MARKER: &str = "HDR";

/// Shortlists ranked candidates: language exclusion, then quality matching,
/// then (when HDR is disabled) HDR exclusion. Rank order is preserved.
#[derive(Debug, Clone)]
pub struct ReleaseFilter {
    banned_words: Vec<String>,
    hdr_enabled: bool,
}

impl Default for ReleaseFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl ReleaseFilter {
    pub fn new(banned_words: Vec<String>, hdr_enabled: bool) -> Self {
        Self {
            banned_words,
            hdr_enabled,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.banned_words.clone(), config.hdr_enabled)
    }

    /// Run every stage in order.
    pub fn apply(
        &self,
        ranked: Vec<ReleaseCandidate>,
        terms: &BTreeSet<String>,
    ) -> Vec<ReleaseCandidate> {
        let total = ranked.len();
        let shortlist = self.exclude_languages(ranked);
        let after_language = shortlist.len();
        let shortlist = match_quality(shortlist, terms);
        let after_quality = shortlist.len();
        let shortlist = if self.hdr_enabled {
            shortlist
        } else {
            exclude_hdr(shortlist)
        };

        debug!(
            total,
            after_language,
            after_quality,
            after_hdr = shortlist.len(),
            "Filtered candidates"
        );
        shortlist
    }

    /// Drop candidates whose title contains a banned substring (case-sensitive).
    pub fn exclude_languages(&self, candidates: Vec<ReleaseCandidate>) -> Vec<ReleaseCandidate> {
        if self.banned_words.is_empty() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|c| !self.banned_words.iter().any(|w| c.title.contains(w.as_str())))
            .collect()
    }
}

/// Keep candidates whose title contains at least [`MIN_TERM_MATCHES`]
/// distinct terms, compared case-insensitively.
pub fn match_quality(
    candidates: Vec<ReleaseCandidate>,
    terms: &BTreeSet<String>,
) -> Vec<ReleaseCandidate> {
    let lowered: BTreeSet<String> = terms.iter().map(|t| t.to_lowercase()).collect();

    candidates
        .into_iter()
        .filter(|c| {
            let title = c.title.to_lowercase();
            lowered.iter().filter(|t| title.contains(t.as_str())).count() >= MIN_TERM_MATCHES
        })
        .collect()
}

/// Drop candidates advertising HDR.
pub fn exclude_hdr(candidates: Vec<ReleaseCandidate>) -> Vec<ReleaseCandidate> {
    candidates
        .into_iter()
        .filter(|c| !c.title.contains(HDR_MARKER))
        .collect()
}
