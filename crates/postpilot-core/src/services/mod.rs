//! Services that keep posts and their publish tasks consistent.

mod posts;
mod publish;
mod reconcile;

#[cfg(test)]
mod testing;

use std::sync::Arc;

pub use posts::PostService;
pub use publish::{PublishHandler, PublishOutcome};
pub use reconcile::{ReconcileReport, Reconciler};

/// Held while a post's task is replaced or cancelled. Foreground mutations and
/// reconciliation share one instance so neither acts on a stale read of a post.
pub type MutationLock = Arc<tokio::sync::Mutex<()>>;
