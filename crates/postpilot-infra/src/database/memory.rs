//! In-memory post repository.
//!
//! Used when no `DATABASE_URL` is configured. Posts are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use postpilot_core::domain::{NewPost, Post, PostId, PostStatus};
use postpilot_core::error::RepoError;
use postpilot_core::ports::{BaseRepository, PostRepository};

#[derive(Default)]
struct Rows {
    last_id: PostId,
    posts: BTreeMap<PostId, Post>,
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    rows: RwLock<Rows>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *row = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        self.rows
            .write()
            .await
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        rows.last_id += 1;
        let post = Post {
            id: rows.last_id,
            title: new_post.title,
            content: new_post.content,
            platform: new_post.platform,
            scheduled_time: new_post.scheduled_time,
            status: PostStatus::Scheduled,
            image_filename: new_post.image_filename,
        };
        rows.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let rows = self.rows.read().await;
        let mut posts: Vec<Post> = rows
            .posts
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.scheduled_time);
        Ok(posts)
    }

    async fn list_by_scheduled_time(&self) -> Result<Vec<Post>, RepoError> {
        let rows = self.rows.read().await;
        let mut posts: Vec<Post> = rows.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.scheduled_time.cmp(&a.scheduled_time));
        Ok(posts)
    }

    async fn mark_posted(&self, id: PostId) -> Result<bool, RepoError> {
        let mut rows = self.rows.write().await;
        match rows.posts.get_mut(&id) {
            Some(post) if post.status == PostStatus::Scheduled => {
                post.status = PostStatus::Posted;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    fn draft(title: &str, at: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
            platform: "linkedin".to_string(),
            scheduled_time: DateTime::parse_from_rfc3339(at).unwrap(),
            image_filename: None,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let repo = InMemoryPostRepository::new();
        let a = repo.create(draft("a", "2025-01-01T10:00:00+05:30")).await.unwrap();
        let b = repo.create(draft("b", "2025-01-01T11:00:00+05:30")).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.status, PostStatus::Scheduled);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryPostRepository::new();
        let a = repo.create(draft("a", "2025-01-01T10:00:00+05:30")).await.unwrap();
        repo.delete(a.id).await.unwrap();

        let b = repo.create(draft("b", "2025-01-01T10:00:00+05:30")).await.unwrap();
        assert_eq!(b.id, 2);
        assert!(matches!(repo.delete(a.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn mark_posted_only_wins_once() {
        let repo = InMemoryPostRepository::new();
        let post = repo.create(draft("a", "2025-01-01T10:00:00+05:30")).await.unwrap();

        assert!(repo.mark_posted(post.id).await.unwrap());
        assert!(!repo.mark_posted(post.id).await.unwrap());
        assert!(!repo.mark_posted(99).await.unwrap());
        assert!(repo.find_by_status(PostStatus::Scheduled).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_and_status_filter_ordering() {
        let repo = InMemoryPostRepository::new();
        let early = repo.create(draft("early", "2025-01-01T10:00:00+05:30")).await.unwrap();
        let mut late = repo.create(draft("late", "2025-01-02T10:00:00+05:30")).await.unwrap();
        late.scheduled_time = late.scheduled_time - Duration::days(2);
        repo.save(late).await.unwrap();

        let listed: Vec<_> = repo
            .list_by_scheduled_time()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(listed, vec!["early", "late"]);

        let scheduled = repo.find_by_status(PostStatus::Scheduled).await.unwrap();
        assert_eq!(scheduled.last().map(|p| p.id), Some(early.id));
    }
}
