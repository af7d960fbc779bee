//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod file_store;
mod notifier;
mod repository;
mod scheduler;

pub use file_store::{FileStore, FileStoreError};
pub use notifier::{Notifier, NotifyError};
pub use repository::{BaseRepository, PostRepository};
pub use scheduler::{
    SchedulerError, TaskFuture, TaskHandler, TaskOutcome, TaskScheduler, TaskStore,
};
