//! Acquisition driver.
//!
//! One pass ingests the calendar into the episode store, then sweeps every
//! pending episode through search, ranking and filtering, and hands the best
//! release to the debrid service. The driver owns no timers; whoever calls
//! [`AcquisitionDriver::run_pass`] decides when passes happen and must not
//! overlap them.

mod runner;
mod types;

pub use runner::AcquisitionDriver;
pub use types::{AcquireOutcome, IngestOutcome, PassReport};
