//! Periodic reverse-cache repair.
//!
//! Runs the full cache rebuild on startup and then at a fixed interval, so
//! drift left by partially failed writes is healed without operator action.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, HookEvent, JobError, JobSchedule, ShutdownBehavior},
};
use crate::notifications::CatalogChange;
use crate::repair::run_repair;
use std::time::Duration;
use tracing::{info, warn};

pub struct CatalogRepairJob {
    interval: Duration,
}

impl CatalogRepairJob {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn every_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours.saturating_mul(60 * 60)))
    }
}

impl BackgroundJob for CatalogRepairJob {
    fn id(&self) -> &'static str {
        "catalog_repair"
    }

    fn name(&self) -> &'static str {
        "Catalog Repair"
    }

    fn description(&self) -> &'static str {
        "Rebuild instrument reverse caches from relation records"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Combined {
            interval: Some(self.interval),
            hooks: vec![HookEvent::OnStartup],
        }
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        // Every step is idempotent, the next run picks up where this one stopped.
        ShutdownBehavior::Cancellable
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let report = run_repair(ctx.catalog_store.as_ref());
        if !report.success {
            return Err(JobError::ExecutionFailed(report.errors.join("; ")));
        }

        if report.errors.is_empty() {
            info!(
                "Catalog repair: {} artists, {} albums, {} artist refs",
                report.artists_updated, report.albums_updated, report.artist_refs_updated
            );
        } else {
            warn!(
                "Catalog repair finished with {} errors: {} artists, {} albums, {} artist refs",
                report.errors.len(),
                report.artists_updated,
                report.albums_updated,
                report.artist_refs_updated
            );
        }
        ctx.notifier.notify(CatalogChange::caches_repaired());
        Ok(())
    }
}
