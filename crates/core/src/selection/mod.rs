//! Release selection: ranking, quality policy resolution and filtering.
//!
//! Everything here is pure. Titles are parsed once at the boundary (seeder
//! count in the ranker, substring checks in the filter) and the rest of the
//! pipeline works on typed values.

mod filter;
mod quality;
mod ranker;
mod types;

pub use filter::{exclude_hdr, match_quality, ReleaseFilter, MIN_TERM_MATCHES};
pub use quality::{resolve_terms, tokenize_quality_name};
pub use ranker::{parse_seeders, rank, SEEDER_MARKER};
pub use types::*;

use thiserror::Error;

/// Errors raised while ranking candidates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The seeder marker or its digit run is missing from a title.
    #[error("Malformed candidate, no seeder count in title: {title}")]
    MalformedCandidate { title: String },
}
