//! In-process notifier backed by a tokio broadcast channel.
//!
//! The socket.io relay subscribes and forwards each event to every
//! connected viewer. Works within a single process only.

use async_trait::async_trait;
use tokio::sync::broadcast;

use postpilot_core::domain::StatusEvent;
use postpilot_core::ports::{Notifier, NotifyError};

pub struct BroadcastNotifier {
    sender: broadcast::Sender<StatusEvent>,
}

impl BroadcastNotifier {
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(&self, event: &StatusEvent) -> Result<(), NotifyError> {
        // A send error only means nobody is listening right now.
        match self.sender.send(event.clone()) {
            Ok(receivers) => {
                tracing::debug!(post_id = event.post_id, status = %event.status, receivers, "Status event published")
            }
            Err(_) => {
                tracing::debug!(post_id = event.post_id, "No viewers connected, status event dropped")
            }
        }
        Ok(())
    }
}
