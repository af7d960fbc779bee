//! Delayed task ports - the durable task registry and the scheduler that fires it.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::domain::ScheduledTask;

/// Result of running a fired task. Tasks fire once; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The callback did its work.
    Completed,
    /// The callback decided there was nothing to do.
    Skipped(String),
    /// The callback failed. Logged, not retried.
    Failed(String),
}

pub type TaskFuture = Pin<Box<dyn Future<Output = TaskOutcome> + Send>>;

/// Callback bound to a task's `callback` name.
pub type TaskHandler = Arc<dyn Fn(ScheduledTask) -> TaskFuture + Send + Sync>;

/// Durable registry of pending tasks that survives process restart.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Add a task, replacing any task with the same id.
    async fn upsert(&self, task: &ScheduledTask) -> Result<(), SchedulerError>;

    /// Remove a task. Returns `false` if no task had that id.
    async fn remove(&self, id: &str) -> Result<bool, SchedulerError>;

    async fn get(&self, id: &str) -> Result<Option<ScheduledTask>, SchedulerError>;

    /// Every persisted task, earliest fire time first.
    async fn load_all(&self) -> Result<Vec<ScheduledTask>, SchedulerError>;
}

/// One-shot delayed execution keyed by task id.
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    /// Register a task. An existing task with the same id is replaced and will
    /// not fire. A fire time in the past fires on the next tick.
    async fn register(&self, task: ScheduledTask) -> Result<(), SchedulerError>;

    /// Drop a pending task. Returns `false` when nothing was registered.
    async fn cancel(&self, id: &str) -> Result<bool, SchedulerError>;

    /// The live registration for an id, if any.
    async fn get(&self, id: &str) -> Option<ScheduledTask>;

    /// Number of live registrations.
    async fn pending(&self) -> usize;
}

/// Scheduler errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Task store error: {0}")]
    Store(String),

    #[error("No handler registered for callback '{0}'")]
    UnknownCallback(String),

    #[error("Scheduler is stopped")]
    Stopped,
}
