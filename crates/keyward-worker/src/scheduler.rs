//! Cron scheduler for periodic maintenance tasks.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use keyward_core::config::WorkerConfig;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;

use crate::jobs::{KeyRotationJob, SessionSweepJob};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(config: WorkerConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, config })
    }

    /// Register every maintenance job
    pub async fn register_default_tasks(
        &self,
        session_sweep: SessionSweepJob,
        key_rotation: KeyRotationJob,
    ) -> AppResult<()> {
        self.register_session_sweep(session_sweep).await?;
        self.register_key_rotation(key_rotation).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Expired token and blacklist sweep
    pub async fn register_session_sweep(&self, job: SessionSweepJob) -> AppResult<()> {
        let schedule = self.config.session_sweep_cron.as_str();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                let summary = job.run();
                tracing::debug!(summary = %summary, "session_sweep finished");
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid session_sweep schedule '{schedule}': {e}"
            ))
        })?;

        self.scheduler.add(cron).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_sweep schedule: {e}"))
        })?;

        tracing::info!(schedule = %schedule, "Registered: session_sweep");
        Ok(())
    }

    /// Active key rotation check
    pub async fn register_key_rotation(&self, job: KeyRotationJob) -> AppResult<()> {
        let schedule = self.config.key_rotation_cron.as_str();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                match job.run().await {
                    Ok(summary) => tracing::debug!(summary = %summary, "key_rotation finished"),
                    Err(e) => tracing::error!(error = %e, "key_rotation failed"),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid key_rotation schedule '{schedule}': {e}"
            ))
        })?;

        self.scheduler.add(cron).await.map_err(|e| {
            AppError::internal(format!("Failed to add key_rotation schedule: {e}"))
        })?;

        tracing::info!(schedule = %schedule, "Registered: key_rotation");
        Ok(())
    }
}
