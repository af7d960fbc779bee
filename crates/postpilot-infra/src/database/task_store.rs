//! SeaORM-backed task store.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DbConn, EntityTrait, QueryOrder};

use postpilot_core::domain::ScheduledTask;
use postpilot_core::ports::{SchedulerError, TaskStore};

use super::entity::scheduled_task::{self, Entity as TaskEntity};

/// Durable task registry in the `scheduled_tasks` table.
pub struct SeaOrmTaskStore {
    db: DbConn,
}

impl SeaOrmTaskStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn store_error(e: sea_orm::DbErr) -> SchedulerError {
    SchedulerError::Store(e.to_string())
}

#[async_trait]
impl TaskStore for SeaOrmTaskStore {
    async fn upsert(&self, task: &ScheduledTask) -> Result<(), SchedulerError> {
        TaskEntity::insert(scheduled_task::ActiveModel::from(task))
            .on_conflict(
                OnConflict::column(scheduled_task::Column::Id)
                    .update_columns([
                        scheduled_task::Column::Callback,
                        scheduled_task::Column::Payload,
                        scheduled_task::Column::FireAt,
                        scheduled_task::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;

        tracing::debug!(task_id = %task.id, fire_at = %task.fire_at, "Task persisted");
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, SchedulerError> {
        let result = TaskEntity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn get(&self, id: &str) -> Result<Option<ScheduledTask>, SchedulerError> {
        let model = TaskEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.map(Into::into))
    }

    async fn load_all(&self) -> Result<Vec<ScheduledTask>, SchedulerError> {
        let models = TaskEntity::find()
            .order_by_asc(scheduled_task::Column::FireAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
