//! Candidate ranking by seeder count.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{ReleaseCandidate, SelectionError};

/// Glyph that precedes the seeder count in indexer titles.
pub const SEEDER_MARKER: &str = "👤";

static SEEDERS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{} (\d+)\s", regex_lite::escape(SEEDER_MARKER)))
        .expect("seeder regex is valid")
});

/// Extract the seeder count from a title like `"... 👤 42 💾 1.2 GB ..."`.
pub fn parse_seeders(title: &str) -> Result<u32, SelectionError> {
    SEEDERS_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| SelectionError::MalformedCandidate {
            title: title.to_string(),
        })
}

/// Order candidates by seeder count, most seeded first.
///
/// The sort is stable, so equally seeded candidates keep the indexer's order.
/// A single unparseable title fails the whole set.
pub fn rank(candidates: Vec<ReleaseCandidate>) -> Result<Vec<ReleaseCandidate>, SelectionError> {
    let mut keyed = candidates
        .into_iter()
        .map(|c| parse_seeders(&c.title).map(|seeders| (seeders, c)))
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(keyed.into_iter().map(|(_, c)| c).collect())
}
