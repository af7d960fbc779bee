//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use postpilot_core::domain::{NewPost, PostStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub platform: String,
    pub scheduled_time: DateTimeWithTimeZone,
    pub status: Status,
    pub image_filename: Option<String>,
}

/// Stored form of [`PostStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Status {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "posted")]
    Posted,
}

impl From<PostStatus> for Status {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Scheduled => Status::Scheduled,
            PostStatus::Posted => Status::Posted,
        }
    }
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Scheduled => PostStatus::Scheduled,
            Status::Posted => PostStatus::Posted,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for postpilot_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            platform: model.platform,
            scheduled_time: model.scheduled_time,
            status: model.status.into(),
            image_filename: model.image_filename,
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<postpilot_core::domain::Post> for ActiveModel {
    fn from(post: postpilot_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            platform: Set(post.platform),
            scheduled_time: Set(post.scheduled_time),
            status: Set(post.status.into()),
            image_filename: Set(post.image_filename),
        }
    }
}

/// A new row; the database assigns the id.
impl From<NewPost> for ActiveModel {
    fn from(post: NewPost) -> Self {
        Self {
            id: NotSet,
            title: Set(post.title),
            content: Set(post.content),
            platform: Set(post.platform),
            scheduled_time: Set(post.scheduled_time),
            status: Set(Status::Scheduled),
            image_filename: Set(post.image_filename),
        }
    }
}
