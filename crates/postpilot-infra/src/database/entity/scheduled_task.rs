//! Persisted one-shot task registrations.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduled_tasks")]
pub struct Model {
    /// Task id, e.g. `post_12`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub callback: String,
    pub payload: Json,
    pub fire_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for postpilot_core::domain::ScheduledTask {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            callback: model.callback,
            payload: model.payload,
            fire_at: model.fire_at,
            created_at: model.created_at.into(),
        }
    }
}

impl From<&postpilot_core::domain::ScheduledTask> for ActiveModel {
    fn from(task: &postpilot_core::domain::ScheduledTask) -> Self {
        Self {
            id: Set(task.id.clone()),
            callback: Set(task.callback.clone()),
            payload: Set(task.payload.clone()),
            fire_at: Set(task.fire_at),
            created_at: Set(task.created_at.into()),
        }
    }
}
