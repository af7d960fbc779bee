//! Test doubles for the ports.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    NewPost, Post, PostId, PostStatus, ScheduledTask, SchedulerClock, StatusEvent,
};
use crate::error::RepoError;
use crate::ports::{
    BaseRepository, FileStore, FileStoreError, Notifier, NotifyError, PostRepository,
    SchedulerError, TaskScheduler,
};

pub fn new_post(title: &str, secs_from_now: i64) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("{title} content"),
        platform: "twitter".to_string(),
        scheduled_time: SchedulerClock::default().now() + chrono::Duration::seconds(secs_from_now),
        image_filename: None,
    }
}

#[derive(Default)]
pub struct MemoryPosts {
    rows: Mutex<(PostId, HashMap<PostId, Post>)>,
}

impl MemoryPosts {
    pub async fn insert(&self, post: NewPost) -> Post {
        self.create(post).await.unwrap()
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for MemoryPosts {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.lock().await.1.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.lock().await;
        match rows.1.get_mut(&post.id) {
            Some(row) => {
                *row = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        self.rows
            .lock()
            .await
            .1
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for MemoryPosts {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut rows = self.rows.lock().await;
        rows.0 += 1;
        let post = Post {
            id: rows.0,
            title: post.title,
            content: post.content,
            platform: post.platform,
            scheduled_time: post.scheduled_time,
            status: PostStatus::Scheduled,
            image_filename: post.image_filename,
        };
        rows.1.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let rows = self.rows.lock().await;
        let mut posts: Vec<_> = rows.1.values().filter(|p| p.status == status).cloned().collect();
        posts.sort_by_key(|p| p.id);
        Ok(posts)
    }

    async fn list_by_scheduled_time(&self) -> Result<Vec<Post>, RepoError> {
        let rows = self.rows.lock().await;
        let mut posts: Vec<_> = rows.1.values().cloned().collect();
        posts.sort_by(|a, b| b.scheduled_time.cmp(&a.scheduled_time));
        Ok(posts)
    }

    async fn mark_posted(&self, id: PostId) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().await;
        match rows.1.get_mut(&id) {
            Some(post) if post.status == PostStatus::Scheduled => {
                post.status = PostStatus::Posted;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Scheduler that only records registrations; nothing ever fires.
#[derive(Default)]
pub struct RecordingScheduler {
    live: Mutex<HashMap<String, ScheduledTask>>,
    failing: Mutex<HashSet<String>>,
    registrations: Mutex<usize>,
}

impl RecordingScheduler {
    pub async fn fail_for(&self, task_id: &str) {
        self.failing.lock().await.insert(task_id.to_string());
    }

    pub async fn registrations(&self) -> usize {
        *self.registrations.lock().await
    }
}

#[async_trait]
impl TaskScheduler for RecordingScheduler {
    async fn register(&self, task: ScheduledTask) -> Result<(), SchedulerError> {
        if self.failing.lock().await.contains(&task.id) {
            return Err(SchedulerError::Store("rejected".into()));
        }
        *self.registrations.lock().await += 1;
        self.live.lock().await.insert(task.id.clone(), task);
        Ok(())
    }

    async fn cancel(&self, id: &str) -> Result<bool, SchedulerError> {
        Ok(self.live.lock().await.remove(id).is_some())
    }

    async fn get(&self, id: &str) -> Option<ScheduledTask> {
        self.live.lock().await.get(id).cloned()
    }

    async fn pending(&self) -> usize {
        self.live.lock().await.len()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<StatusEvent>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, event: &StatusEvent) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::PublishError("channel closed".into()));
        }
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFiles {
    pub async fn put(&self, name: &str) {
        self.files.lock().await.insert(name.to_string(), b"img".to_vec());
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.files.lock().await.contains_key(name)
    }
}

#[async_trait]
impl FileStore for MemoryFiles {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, FileStoreError> {
        self.files.lock().await.insert(name.to_string(), bytes.to_vec());
        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<bool, FileStoreError> {
        Ok(self.files.lock().await.remove(name).is_some())
    }

    async fn exists(&self, name: &str) -> Result<bool, FileStoreError> {
        Ok(self.contains(name).await)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, FileStoreError> {
        self.files
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| FileStoreError::NotFound(name.to_string()))
    }
}
