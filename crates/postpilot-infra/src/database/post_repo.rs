//! SeaORM post repository.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use postpilot_core::domain::{NewPost, Post, PostId, PostStatus};
use postpilot_core::error::RepoError;
use postpilot_core::ports::PostRepository;

use super::base::{SeaOrmRepository, query_error};
use super::entity::post::{self, Entity as PostEntity};

/// SeaORM post repository (SQLite or PostgreSQL).
pub type SeaOrmPostRepository = SeaOrmRepository<PostEntity>;

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new_post)
            .insert(&self.db)
            .await
            .map_err(query_error)?;

        tracing::debug!(post_id = model.id, "Post row inserted");
        Ok(model.into())
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq(post::Status::from(status)))
            .order_by_asc(post::Column::ScheduledTime)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_by_scheduled_time(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::ScheduledTime)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn mark_posted(&self, id: PostId) -> Result<bool, RepoError> {
        // Single conditional UPDATE, so two racing publishers cannot both win.
        let result = PostEntity::update_many()
            .col_expr(post::Column::Status, Expr::value(post::Status::Posted))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Status.eq(post::Status::Scheduled))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected == 1)
    }
}
