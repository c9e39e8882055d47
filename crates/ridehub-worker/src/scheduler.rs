//! Cron scheduler for the expiry sweeper.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use ridehub_core::config::worker::WorkerConfig;
use ridehub_core::error::AppError;

use crate::sweeper::ExpirySweeper;

/// Cron-based scheduler driving the expiry sweeper.
///
/// The sweeper itself stays directly invokable (`sweep_once`); this type
/// only owns the cadence and the shutdown hook.
pub struct SweeperScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// The sweeper to drive.
    sweeper: Arc<ExpirySweeper>,
}

impl std::fmt::Debug for SweeperScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweeperScheduler").finish()
    }
}

impl SweeperScheduler {
    /// Create a new scheduler around a sweeper.
    pub async fn new(sweeper: Arc<ExpirySweeper>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, sweeper })
    }

    /// Register the sweep task at the configured cadence.
    pub async fn register_sweep(&self, config: &WorkerConfig) -> Result<(), AppError> {
        let schedule = sweep_schedule(config.sweep_interval_seconds);
        let sweeper = Arc::clone(&self.sweeper);

        let job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                match sweeper.sweep_once().await {
                    Ok(report) if report.expired > 0 || report.failed > 0 => {
                        tracing::info!(
                            expired = report.expired,
                            failed = report.failed,
                            "Scheduled expiry sweep finished"
                        );
                    }
                    Ok(_) => {
                        tracing::trace!("Scheduled expiry sweep found nothing to reconcile");
                    }
                    Err(e) => {
                        tracing::error!("Scheduled expiry sweep failed: {e}");
                    }
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        tracing::info!(schedule = %schedule, "Registered: expiry_sweep");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Sweeper scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Sweeper scheduler shut down");
        Ok(())
    }
}

/// Translate an interval in seconds into a 6-field cron expression.
///
/// Sub-minute intervals must divide 60 evenly; anything else rounds to
/// whole minutes.
fn sweep_schedule(interval_seconds: u64) -> String {
    if interval_seconds < 60 && 60 % interval_seconds == 0 {
        format!("*/{interval_seconds} * * * * *")
    } else {
        let minutes = (interval_seconds / 60).max(1);
        format!("0 */{minutes} * * * *")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_minute_intervals_use_second_field() {
        assert_eq!(sweep_schedule(30), "*/30 * * * * *");
        assert_eq!(sweep_schedule(15), "*/15 * * * * *");
    }

    #[test]
    fn minute_and_above_round_to_minutes() {
        assert_eq!(sweep_schedule(60), "0 */1 * * * *");
        assert_eq!(sweep_schedule(300), "0 */5 * * * *");
        // 90s does not divide a minute evenly; rounds down to 1 minute.
        assert_eq!(sweep_schedule(90), "0 */1 * * * *");
    }
}
