use std::sync::Arc;

use crate::domain::{NewPost, Post, PostChanges, PostId, ScheduledTask, task_id_for_post};
use crate::error::DomainError;
use crate::ports::{FileStore, FileStoreError, PostRepository, TaskScheduler};

use super::MutationLock;

/// Create, edit and delete posts while keeping their publish tasks in step.
///
/// Scheduler failures are logged and never reach the caller; failures of the
/// post record itself are returned.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    scheduler: Arc<dyn TaskScheduler>,
    files: Arc<dyn FileStore>,
    mutation: MutationLock,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        scheduler: Arc<dyn TaskScheduler>,
        files: Arc<dyn FileStore>,
        mutation: MutationLock,
    ) -> Self {
        Self {
            posts,
            scheduler,
            files,
            mutation,
        }
    }

    /// Every post, latest scheduled time first.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_by_scheduled_time().await?)
    }

    pub async fn get(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub async fn create(&self, new_post: NewPost) -> Result<Post, DomainError> {
        new_post.validate()?;
        if let Some(image) = &new_post.image_filename {
            self.ensure_image_exists(image).await?;
        }

        let _lock = self.mutation.lock().await;
        let post = self.posts.create(new_post).await?;
        tracing::info!(post_id = post.id, scheduled_time = %post.scheduled_time, "Post created");

        self.arm(&post).await;
        Ok(post)
    }

    pub async fn edit(&self, id: PostId, changes: PostChanges) -> Result<Post, DomainError> {
        changes.validate()?;
        if let Some(image) = &changes.image_filename {
            self.ensure_image_exists(image).await?;
        }

        let _lock = self.mutation.lock().await;
        let mut post = self.get(id).await?;
        let replaced_image = post.apply(changes);
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = post.id, scheduled_time = %post.scheduled_time, "Post updated");

        if let Some(old) = replaced_image {
            self.remove_image(post.id, &old).await;
        }

        // Re-register even if the time did not change, so no stale fire time survives.
        if post.is_scheduled() {
            self.arm(&post).await;
        } else {
            self.disarm(post.id).await;
        }
        Ok(post)
    }

    pub async fn delete(&self, id: PostId) -> Result<(), DomainError> {
        let _lock = self.mutation.lock().await;
        let post = self.get(id).await?;

        // Cancel before the record goes, so the task cannot fire in between.
        self.disarm(post.id).await;

        if let Some(image) = &post.image_filename {
            self.remove_image(post.id, image).await;
        }

        self.posts.delete(post.id).await?;
        tracing::info!(post_id = post.id, "Post deleted");
        Ok(())
    }

    async fn ensure_image_exists(&self, name: &str) -> Result<(), DomainError> {
        match self.files.exists(name).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DomainError::Validation(format!(
                "image '{name}' has not been uploaded"
            ))),
            Err(FileStoreError::InvalidName(name)) => {
                Err(DomainError::Validation(format!("invalid image name {name:?}")))
            }
            Err(e) => Err(DomainError::Internal(e.to_string())),
        }
    }

    async fn arm(&self, post: &Post) {
        let task = ScheduledTask::publish_post(post.id, post.scheduled_time);
        let task_id = task.id.clone();
        match self.scheduler.register(task).await {
            Ok(()) => {
                tracing::info!(post_id = post.id, task_id = %task_id, fire_at = %post.scheduled_time, "Publish task scheduled")
            }
            Err(e) => {
                tracing::error!(post_id = post.id, task_id = %task_id, error = %e, "Failed to schedule publish task")
            }
        }
    }

    async fn disarm(&self, post_id: PostId) {
        let task_id = task_id_for_post(post_id);
        match self.scheduler.cancel(&task_id).await {
            Ok(true) => tracing::info!(post_id, task_id = %task_id, "Publish task cancelled"),
            Ok(false) => tracing::warn!(
                post_id,
                task_id = %task_id,
                "No publish task to cancel, it may have already run"
            ),
            Err(e) => {
                tracing::error!(post_id, task_id = %task_id, error = %e, "Failed to cancel publish task")
            }
        }
    }

    async fn remove_image(&self, post_id: PostId, name: &str) {
        match self.files.delete(name).await {
            Ok(true) => tracing::debug!(post_id, image = %name, "Image removed"),
            Ok(false) => tracing::debug!(post_id, image = %name, "Image already gone"),
            Err(e) => tracing::error!(post_id, image = %name, error = %e, "Failed to remove image"),
        }
    }
}
