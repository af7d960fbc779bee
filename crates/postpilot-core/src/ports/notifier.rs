//! Notification port - fan-out of status changes to connected viewers.

use async_trait::async_trait;

use crate::domain::StatusEvent;

/// Fire-and-forget broadcast. No delivery guarantee, missed events are not kept.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: &StatusEvent) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to publish: {0}")]
    PublishError(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
