//! Scan scheduler loops: fixed-cadence ticks via tokio intervals.
//!
//! Each loop runs its scan, logs the outcome, and keeps ticking no matter
//! what the scan returned. Overlap across runs is accepted: the scans carry
//! no cross-run state and the lookahead windows intentionally overlap the
//! cadence.

use std::sync::Arc;

use chrono::{Local, Utc};
use classbell_core::config::ScanConfig;
use classbell_push::PushTransport;
use classbell_store::DocumentStore;
use tokio::task::JoinHandle;

use crate::class_start_scan::run_class_start_scan;
use crate::deadline_scan::run_deadline_scan;
use crate::deliver::Deliverer;

/// Spawn both scan loops. The handles live until aborted.
pub fn spawn_scans(
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushTransport>,
    scan: &ScanConfig,
    icon_url: &str,
) -> Vec<JoinHandle<()>> {
    let deliverer = Deliverer::new(store.clone(), push, icon_url);

    let deadline = {
        let store = store.clone();
        let deliverer = deliverer.clone();
        let every_hours = scan.deadline_every_hours;
        let lookahead = scan.deadline_lookahead_hours;
        tokio::spawn(async move {
            tracing::info!(
                "⏰ Deadline scan started (every {every_hours}h, {lookahead}h lookahead)"
            );
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(every_hours * 3600));
            loop {
                interval.tick().await;
                match run_deadline_scan(&store, &deliverer, Utc::now(), lookahead).await {
                    Ok(0) => tracing::debug!("Deadline scan: nothing due"),
                    Ok(n) => tracing::info!("Deadline scan delivered {n} reminder(s)"),
                    Err(e) => tracing::error!("Deadline scan failed: {e}"),
                }
            }
        })
    };

    let class_start = {
        let every_mins = scan.class_start_every_mins;
        let lookahead = scan.class_start_lookahead_mins;
        tokio::spawn(async move {
            tracing::info!(
                "⏰ Class-start scan started (every {every_mins}m, {lookahead}m lookahead)"
            );
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(every_mins * 60));
            loop {
                interval.tick().await;
                let now = Local::now().naive_local();
                match run_class_start_scan(&store, &deliverer, now, lookahead).await {
                    Ok(0) => tracing::debug!("Class-start scan: nothing imminent"),
                    Ok(n) => tracing::info!("Class-start scan delivered {n} reminder(s)"),
                    Err(e) => tracing::error!("Class-start scan failed: {e}"),
                }
            }
        })
    };

    vec![deadline, class_start]
}
