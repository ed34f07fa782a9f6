//! Periodic pass scheduling.
//!
//! Passes run back to back on a fixed interval. A pass that overruns its slot
//! skips the missed ticks, so two passes never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

use airtime_core::{config::SchedulerConfig, AcquisitionDriver};

use crate::state::AppState;

/// Spawn the pass loop. It exits once `shutdown` fires, after the pass in
/// flight (if any) completes.
pub fn spawn(
    driver: AcquisitionDriver,
    state: Arc<AppState>,
    config: &SchedulerConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    let period = Duration::from_secs(config.interval_secs);
    let start = if config.run_on_start {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut interval = interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), "Scheduler started");
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Scheduler received shutdown signal");
                    break;
                }
                _ = interval.tick() => {
                    let report = driver.run_pass().await;
                    state.set_last_report(report).await;
                }
            }
        }
        info!("Scheduler stopped");
    })
}
