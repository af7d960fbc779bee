//! Delayed task scheduler.
//!
//! Registrations live in a single map keyed by task id and are mirrored to a
//! [`TaskStore`] so they survive restart. A background loop sleeps until the
//! earliest fire time (capped by the poll interval), dequeues everything that
//! is due and runs the bound handler. Each task fires at most once and is
//! never retried.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, RwLock, watch};
use tokio::task::JoinHandle;

use postpilot_core::domain::{ScheduledTask, SchedulerClock};
use postpilot_core::ports::{SchedulerError, TaskHandler, TaskOutcome, TaskScheduler, TaskStore};

/// Delayed scheduler configuration.
#[derive(Debug, Clone)]
pub struct DelayedSchedulerConfig {
    /// Longest the loop sleeps before re-checking for due tasks.
    pub poll_interval: Duration,
}

impl Default for DelayedSchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl DelayedSchedulerConfig {
    pub fn from_env() -> Self {
        let poll_interval = std::env::var("SCHEDULER_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(1));

        Self { poll_interval }
    }
}

struct Inner {
    store: Arc<dyn TaskStore>,
    clock: SchedulerClock,
    config: DelayedSchedulerConfig,
    // Live registrations. The store is written while this lock is held so the
    // two never disagree about which registration for an id is current.
    tasks: Mutex<HashMap<String, ScheduledTask>>,
    handlers: RwLock<HashMap<String, TaskHandler>>,
    wake: Notify,
    shutdown: watch::Sender<bool>,
}

/// Persistent one-shot scheduler driven by a single tokio task.
pub struct DelayedTaskScheduler {
    inner: Arc<Inner>,
    started: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DelayedTaskScheduler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clock: SchedulerClock,
        config: DelayedSchedulerConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                store,
                clock,
                config,
                tasks: Mutex::new(HashMap::new()),
                handlers: RwLock::new(HashMap::new()),
                wake: Notify::new(),
                shutdown,
            }),
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Bind a handler to a callback name. Binding the same name again replaces it.
    pub async fn register_handler(&self, callback: impl Into<String>, handler: TaskHandler) {
        let callback = callback.into();
        tracing::debug!(callback = %callback, "Task handler registered");
        self.inner.handlers.write().await.insert(callback, handler);
    }

    /// Restore persisted registrations and start the firing loop.
    ///
    /// Returns how many registrations were restored from the store. A live
    /// registration made before `start` wins over a persisted one.
    pub async fn start(&self) -> Result<usize, SchedulerError> {
        if self.is_stopped() {
            return Err(SchedulerError::Stopped);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Delayed scheduler already started");
            return Ok(0);
        }

        let persisted = self.inner.store.load_all().await?;
        let restored = {
            let mut tasks = self.inner.tasks.lock().await;
            let mut restored = 0;
            for task in persisted {
                tasks.entry(task.id.clone()).or_insert_with(|| {
                    restored += 1;
                    task
                });
            }
            restored
        };

        let inner = Arc::clone(&self.inner);
        let shutdown = self.inner.shutdown.subscribe();
        *self.worker.lock().await = Some(tokio::spawn(run_loop(inner, shutdown)));

        tracing::info!(
            restored,
            poll_interval_ms = self.inner.config.poll_interval.as_millis() as u64,
            "Delayed scheduler started"
        );
        Ok(restored)
    }

    /// Stop the loop and wait for a handler that is mid-run to finish.
    ///
    /// Pending registrations stay in the store for the next start.
    pub async fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
        self.inner.wake.notify_one();

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Delayed scheduler loop ended abnormally");
            }
        }
        tracing::info!("Delayed scheduler stopped");
    }

    fn is_stopped(&self) -> bool {
        *self.inner.shutdown.borrow()
    }
}

#[async_trait]
impl TaskScheduler for DelayedTaskScheduler {
    async fn register(&self, task: ScheduledTask) -> Result<(), SchedulerError> {
        if self.is_stopped() {
            return Err(SchedulerError::Stopped);
        }
        if !self.inner.handlers.read().await.contains_key(&task.callback) {
            return Err(SchedulerError::UnknownCallback(task.callback));
        }

        let mut tasks = self.inner.tasks.lock().await;
        self.inner.store.upsert(&task).await?;
        let replaced = tasks.insert(task.id.clone(), task.clone()).is_some();
        drop(tasks);

        tracing::debug!(
            task_id = %task.id,
            callback = %task.callback,
            fire_at = %task.fire_at,
            replaced,
            "Task registered"
        );
        self.inner.wake.notify_one();
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<bool, SchedulerError> {
        let mut tasks = self.inner.tasks.lock().await;
        // Row first: if the store fails, the live entry and the row still agree.
        let stored = self.inner.store.remove(id).await?;
        let live = tasks.remove(id).is_some();
        drop(tasks);

        if live || stored {
            tracing::debug!(task_id = %id, "Task cancelled");
        }
        Ok(live || stored)
    }

    async fn get(&self, id: &str) -> Option<ScheduledTask> {
        self.inner.tasks.lock().await.get(id).cloned()
    }

    async fn pending(&self) -> usize {
        self.inner.tasks.lock().await.len()
    }
}

async fn run_loop(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        inner.fire_due().await;

        let wait = inner.next_wait().await;
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = inner.wake.notified() => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

impl Inner {
    async fn next_wait(&self) -> Duration {
        let now = self.clock.now();
        let tasks = self.tasks.lock().await;
        tasks
            .values()
            .map(|t| t.fire_at)
            .min()
            .map(|earliest| (earliest - now).to_std().unwrap_or(Duration::ZERO))
            .map_or(self.config.poll_interval, |until| {
                until.min(self.config.poll_interval)
            })
    }

    async fn fire_due(&self) {
        let now = self.clock.now();
        let mut due = {
            let mut tasks = self.tasks.lock().await;
            let ids: Vec<String> = tasks
                .values()
                .filter(|t| t.is_due(now))
                .map(|t| t.id.clone())
                .collect();

            let mut due = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(task) = tasks.remove(&id) {
                    if let Err(e) = self.store.remove(&id).await {
                        tracing::warn!(task_id = %id, error = %e, "Failed to remove fired task from store");
                    }
                    due.push(task);
                }
            }
            due
        };

        due.sort_by_key(|t| t.fire_at);
        for task in due {
            self.execute(task).await;
        }
    }

    async fn execute(&self, task: ScheduledTask) {
        let handler = self.handlers.read().await.get(&task.callback).cloned();
        let Some(handler) = handler else {
            tracing::error!(task_id = %task.id, callback = %task.callback, "No handler for task, dropping it");
            return;
        };

        let task_id = task.id.clone();
        let late_ms = (self.clock.now() - task.fire_at).num_milliseconds();
        tracing::debug!(task_id = %task_id, late_ms, "Firing task");

        // Run on its own task so a panicking handler cannot take the loop down.
        match tokio::spawn(async move { handler(task).await }).await {
            Ok(TaskOutcome::Completed) => tracing::info!(task_id = %task_id, "Task completed"),
            Ok(TaskOutcome::Skipped(reason)) => {
                tracing::info!(task_id = %task_id, reason = %reason, "Task skipped")
            }
            Ok(TaskOutcome::Failed(reason)) => {
                tracing::error!(task_id = %task_id, reason = %reason, "Task failed")
            }
            Err(e) => tracing::error!(task_id = %task_id, error = %e, "Task handler panicked"),
        }
    }
}
