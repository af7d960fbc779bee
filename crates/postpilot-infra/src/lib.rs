//! # Postpilot Infrastructure
//!
//! Concrete implementations of the ports defined in `postpilot-core`:
//! post and task persistence, the delayed task scheduler, the status
//! notifier and upload storage.
//!
//! ## Feature Flags
//!
//! - `database` (default) - SQLite and PostgreSQL persistence via SeaORM
//! - `minimal` - No external storage, in-memory stores only

pub mod database;
pub mod files;
pub mod notify;
pub mod scheduler;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryPostRepository};
pub use files::{LocalFileStore, secure_filename};
pub use notify::BroadcastNotifier;
pub use scheduler::{DelayedSchedulerConfig, DelayedTaskScheduler, InMemoryTaskStore};

// Re-exports - SeaORM
#[cfg(feature = "database")]
pub use database::{SeaOrmPostRepository, SeaOrmTaskStore, connect};
