//! Cron-style jobs using tokio-cron-scheduler.
//!
//! Carries the optional periodic reconciliation sweep. One-shot publish
//! tasks are not cron jobs; they live in the delayed task scheduler.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use postpilot_core::services::Reconciler;

/// Cron job scheduler wrapper.
pub struct CronScheduler {
    inner: JobScheduler,
}

impl CronScheduler {
    pub async fn new() -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner })
    }

    /// Add a cron job. Expressions carry a seconds field, e.g. `0 */5 * * * *`.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Re-run reconciliation on `schedule`. Overlapping passes are skipped by the reconciler.
    pub async fn add_reconcile_sweep(
        &self,
        schedule: &str,
        reconciler: Arc<Reconciler>,
    ) -> Result<uuid::Uuid, JobSchedulerError> {
        self.add_cron(schedule, move || {
            let reconciler = reconciler.clone();
            async move {
                let report = reconciler.sweep().await;
                if report.rearmed > 0 || report.published > 0 {
                    tracing::warn!(
                        rearmed = report.rearmed,
                        published = report.published,
                        "Reconciliation sweep repaired missing publish tasks"
                    );
                }
            }
        })
        .await
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.inner.start().await?;
        tracing::info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Cron scheduler stopped");
        Ok(())
    }
}
