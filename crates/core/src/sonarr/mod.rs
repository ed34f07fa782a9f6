//! Sonarr series manager client.
//!
//! Provides the calendar, episode details and quality profiles consumed by
//! the acquisition pass.

mod client;
mod payloads;

pub use client::SonarrClient;
