//! In-memory task store.
//!
//! Fallback when no database is configured. Registrations are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use postpilot_core::domain::ScheduledTask;
use postpilot_core::ports::{SchedulerError, TaskStore};

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, ScheduledTask>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn upsert(&self, task: &ScheduledTask) -> Result<(), SchedulerError> {
        self.tasks
            .write()
            .await
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, SchedulerError> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }

    async fn get(&self, id: &str) -> Result<Option<ScheduledTask>, SchedulerError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<ScheduledTask>, SchedulerError> {
        let mut tasks: Vec<ScheduledTask> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|t| t.fire_at);
        Ok(tasks)
    }
}
