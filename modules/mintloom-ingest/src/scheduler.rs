//! Periodic driver for the ingestion pipeline.
//!
//! One background task: an immediate run at startup, then one per interval.
//! Run failures are logged and retried next tick. Shutdown lets the
//! in-flight mention finish — no torn writes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::ingestor::Ingestor;

pub async fn run_scheduled(
    ingestor: Arc<Ingestor>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs = every.as_secs(), "Mention polling started");

    loop {
        tokio::select! {
            // First tick completes immediately — the startup run.
            _ = ticker.tick() => {
                if let Err(e) = ingestor.run_batch(Some(&shutdown)).await {
                    warn!(error = %e, "Ingestion run failed, will retry next tick");
                }
                if *shutdown.borrow() {
                    break;
                }
            }
            _ = shutdown.changed() => {
                break;
            }
        }
    }

    info!("Mention polling stopped");
}
