use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{Post, PostStatus, ScheduledTask, SchedulerClock, task_id_for_post};
use crate::ports::{PostRepository, TaskScheduler};

use super::MutationLock;
use super::publish::{PublishHandler, PublishOutcome};

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Scheduled posts looked at.
    pub examined: usize,
    /// Overdue posts published during the pass.
    pub published: usize,
    /// Future posts (re-)registered with the scheduler.
    pub rearmed: usize,
    /// Posts that needed nothing.
    pub unchanged: usize,
    /// Posts whose publish or registration failed.
    pub failed: usize,
    /// The pass did not run because another was in progress or startup already ran.
    pub skipped: bool,
}

impl ReconcileReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Startup,
    Sweep,
}

/// Repairs the scheduler's task set from the post store.
///
/// Overdue scheduled posts are published on the spot; future ones are
/// registered under their deterministic task id. Passes never overlap, and
/// each post is re-read under the shared [`MutationLock`] before it is acted on.
pub struct Reconciler {
    posts: Arc<dyn PostRepository>,
    scheduler: Arc<dyn TaskScheduler>,
    publisher: Arc<PublishHandler>,
    clock: SchedulerClock,
    mutation: MutationLock,
    startup_done: AtomicBool,
    in_progress: AtomicBool,
}

impl Reconciler {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        scheduler: Arc<dyn TaskScheduler>,
        publisher: Arc<PublishHandler>,
        clock: SchedulerClock,
        mutation: MutationLock,
    ) -> Self {
        Self {
            posts,
            scheduler,
            publisher,
            clock,
            mutation,
            startup_done: AtomicBool::new(false),
            in_progress: AtomicBool::new(false),
        }
    }

    /// The startup pass. Runs at most once per instance.
    pub async fn run_startup(&self) -> ReconcileReport {
        if self.startup_done.swap(true, Ordering::SeqCst) {
            tracing::warn!("Startup reconciliation already ran, ignoring second call");
            return ReconcileReport::skipped();
        }
        self.reconcile(Pass::Startup).await
    }

    /// A periodic pass. Leaves live registrations with the right fire time alone.
    pub async fn sweep(&self) -> ReconcileReport {
        self.reconcile(Pass::Sweep).await
    }

    async fn reconcile(&self, pass: Pass) -> ReconcileReport {
        let Some(_guard) = PassGuard::acquire(&self.in_progress) else {
            tracing::warn!(?pass, "Reconciliation already in progress, skipping");
            return ReconcileReport::skipped();
        };

        let mut report = ReconcileReport::default();
        let posts = match self.posts.find_by_status(PostStatus::Scheduled).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::error!(?pass, error = %e, "Failed to load scheduled posts");
                report.failed += 1;
                return report;
            }
        };
        tracing::info!(?pass, count = posts.len(), "Reconciling scheduled posts");

        for snapshot in posts {
            report.examined += 1;
            let _lock = self.mutation.lock().await;

            // The snapshot may predate an edit or delete.
            let post = match self.posts.find_by_id(snapshot.id).await {
                Ok(Some(post)) if post.is_scheduled() => post,
                Ok(_) => {
                    tracing::debug!(post_id = snapshot.id, "Post changed since the snapshot, nothing to do");
                    report.unchanged += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(post_id = snapshot.id, error = %e, "Failed to re-read post");
                    report.failed += 1;
                    continue;
                }
            };

            self.reconcile_post(pass, &post, &mut report).await;
        }

        tracing::info!(
            ?pass,
            examined = report.examined,
            published = report.published,
            rearmed = report.rearmed,
            unchanged = report.unchanged,
            failed = report.failed,
            "Reconciliation finished"
        );
        report
    }

    async fn reconcile_post(&self, pass: Pass, post: &Post, report: &mut ReconcileReport) {
        let task_id = task_id_for_post(post.id);
        let fire_at = self.clock.normalize(post.scheduled_time);

        if fire_at <= self.clock.now() {
            tracing::info!(post_id = post.id, %fire_at, "Scheduled time has passed, publishing now");
            match self.publisher.publish(post.id).await {
                Ok(PublishOutcome::Published) => report.published += 1,
                Ok(_) => report.unchanged += 1,
                Err(e) => {
                    tracing::error!(post_id = post.id, error = %e, "Immediate publish failed");
                    report.failed += 1;
                }
            }
            // A restored registration for this post must not fire again.
            if let Err(e) = self.scheduler.cancel(&task_id).await {
                tracing::warn!(post_id = post.id, task_id = %task_id, error = %e, "Failed to drop stale task");
            }
            return;
        }

        if pass == Pass::Sweep {
            if let Some(live) = self.scheduler.get(&task_id).await {
                if live.fire_at == fire_at {
                    report.unchanged += 1;
                    return;
                }
            }
        }

        match self
            .scheduler
            .register(ScheduledTask::publish_post(post.id, fire_at))
            .await
        {
            Ok(()) => {
                tracing::info!(post_id = post.id, task_id = %task_id, %fire_at, "Publish task armed");
                report.rearmed += 1;
            }
            Err(e) => {
                tracing::error!(post_id = post.id, task_id = %task_id, error = %e, "Failed to arm publish task");
                report.failed += 1;
            }
        }
    }
}

/// Clears the in-progress flag when a pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
