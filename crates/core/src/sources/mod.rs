//! Collaborator abstractions.
//!
//! The acquisition pass talks to four external services through these
//! traits: the series manager (calendar, episode details, quality
//! profiles), the torrent indexer, the debrid service and the media server.
//! Concrete HTTP clients live in their own modules.

mod types;

pub use types::*;
