//! Prometheus metrics for the acquisition pass.
//!
//! The statics are created lazily and registered by the server through
//! [`all_metrics`].

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Passes
// =============================================================================

/// Passes run total.
pub static PASSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("airtime_passes_total", "Total acquisition passes run").unwrap()
});

/// Pass duration in seconds.
pub static PASS_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "airtime_pass_duration_seconds",
            "Duration of a full ingest and acquire pass",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

// =============================================================================
// Ingestion
// =============================================================================

/// Calendar episodes processed, by outcome.
pub static EPISODES_INGESTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "airtime_episodes_ingested_total",
            "Calendar episodes processed during ingestion",
        ),
        // "newly_tracked", "already_downloaded", "already_searching", "not_aired", "skipped"
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Acquisition
// =============================================================================

/// Acquisition attempts, by result.
pub static ACQUISITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("airtime_acquisitions_total", "Total acquisition attempts"),
        // "downloaded", "no_match", "malformed", "source_error", "submit_error"
        &["result"],
    )
    .unwrap()
});

/// Candidates returned by the indexer per search.
pub static CANDIDATES_FOUND: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "airtime_candidates_found",
            "Number of candidates found per episode search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

/// Library refreshes signaled.
pub static LIBRARY_REFRESHES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "airtime_library_refreshes_total",
        "Total media library refreshes signaled",
    )
    .unwrap()
});

// =============================================================================
// External services
// =============================================================================

/// Collaborator calls, by service, operation and status.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "airtime_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Record one collaborator call.
pub fn record_external_call<T, E>(service: &str, operation: &str, result: &Result<T, E>) {
    let status = if result.is_ok() { "success" } else { "error" };
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, status])
        .inc();
}

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PASSES_TOTAL.clone()),
        Box::new(PASS_DURATION.clone()),
        Box::new(EPISODES_INGESTED.clone()),
        Box::new(ACQUISITIONS_TOTAL.clone()),
        Box::new(CANDIDATES_FOUND.clone()),
        Box::new(LIBRARY_REFRESHES.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        ACQUISITIONS_TOTAL.with_label_values(&["downloaded"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"airtime_acquisitions_total".to_string()));
    }

    #[test]
    fn test_record_external_call() {
        let ok: Result<(), ()> = Ok(());
        let before = EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["test", "probe", "success"])
            .get();
        record_external_call("test", "probe", &ok);
        let after = EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["test", "probe", "success"])
            .get();
        assert_eq!(after, before + 1);
    }
}
