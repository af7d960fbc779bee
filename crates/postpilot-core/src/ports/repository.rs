use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostId, PostStatus};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist every field of an existing entity.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Insert a new post in `Scheduled` state. The store assigns the id.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError>;

    /// All posts, latest scheduled time first.
    async fn list_by_scheduled_time(&self) -> Result<Vec<Post>, RepoError>;

    /// Atomically move a post from `Scheduled` to `Posted`.
    ///
    /// Returns `false` when the post is missing or was not `Scheduled`.
    async fn mark_posted(&self, id: PostId) -> Result<bool, RepoError>;
}
