use std::fmt;
use std::sync::Arc;

use crate::domain::{PostId, ScheduledTask, SchedulerClock, StatusEvent};
use crate::error::DomainError;
use crate::ports::{Notifier, PostRepository, TaskFuture, TaskHandler, TaskOutcome};

/// What a publish attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Status moved to `posted` and viewers were notified.
    Published,
    /// The post no longer exists.
    Missing,
    /// The post was not `scheduled` any more.
    AlreadyPosted,
    /// The post's scheduled time has not been reached.
    NotDue,
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PublishOutcome::Published => "published",
            PublishOutcome::Missing => "post missing",
            PublishOutcome::AlreadyPosted => "post not in scheduled state",
            PublishOutcome::NotDue => "scheduled time not reached",
        };
        f.write_str(s)
    }
}

/// The only code path that moves a post from `scheduled` to `posted`.
pub struct PublishHandler {
    posts: Arc<dyn PostRepository>,
    notifier: Arc<dyn Notifier>,
    clock: SchedulerClock,
}

impl PublishHandler {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        notifier: Arc<dyn Notifier>,
        clock: SchedulerClock,
    ) -> Self {
        Self {
            posts,
            notifier,
            clock,
        }
    }

    /// Publish a post if, and only if, it is still scheduled and due.
    pub async fn publish(&self, post_id: PostId) -> Result<PublishOutcome, DomainError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            tracing::warn!(post_id, "Post not found, nothing to publish");
            return Ok(PublishOutcome::Missing);
        };

        if !post.is_scheduled() {
            tracing::info!(post_id, status = %post.status, "Post is not scheduled, skipping");
            return Ok(PublishOutcome::AlreadyPosted);
        }

        // A task armed before the post was rescheduled must not publish early.
        let now = self.clock.now();
        if self.clock.normalize(post.scheduled_time) > now {
            tracing::warn!(
                post_id,
                scheduled_time = %post.scheduled_time,
                %now,
                "Post is not due yet, skipping"
            );
            return Ok(PublishOutcome::NotDue);
        }

        // Conditional update: a concurrent publish that got there first wins.
        if !self.posts.mark_posted(post_id).await? {
            tracing::info!(post_id, "Post changed state before it could be published, skipping");
            return Ok(PublishOutcome::AlreadyPosted);
        }

        if let Err(e) = self.notifier.publish(&StatusEvent::posted(post_id)).await {
            tracing::warn!(post_id, error = %e, "Failed to notify viewers");
        }

        tracing::info!(post_id, platform = %post.platform, "Post marked as posted");
        Ok(PublishOutcome::Published)
    }

    /// Adapter binding this handler to the scheduler's `publish_post` callback.
    pub fn task_handler(self: &Arc<Self>) -> TaskHandler {
        let handler = Arc::clone(self);
        Arc::new(move |task: ScheduledTask| -> TaskFuture {
            let handler = handler.clone();
            Box::pin(async move {
                let Some(post_id) = task.post_id() else {
                    return TaskOutcome::Failed(format!("task {} has no post_id argument", task.id));
                };

                match handler.publish(post_id).await {
                    Ok(PublishOutcome::Published) => TaskOutcome::Completed,
                    Ok(outcome) => TaskOutcome::Skipped(outcome.to_string()),
                    Err(e) => TaskOutcome::Failed(e.to_string()),
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PUBLISH_POST, PostStatus};
    use crate::ports::BaseRepository;
    use crate::services::testing::{MemoryPosts, RecordingNotifier, new_post};

    fn handler(posts: &Arc<MemoryPosts>, notifier: &Arc<RecordingNotifier>) -> Arc<PublishHandler> {
        Arc::new(PublishHandler::new(
            posts.clone(),
            notifier.clone(),
            SchedulerClock::default(),
        ))
    }

    #[tokio::test]
    async fn publishes_scheduled_post_once() {
        let posts = Arc::new(MemoryPosts::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let post = posts.insert(new_post("A", -60)).await;

        let publisher = handler(&posts, &notifier);
        assert_eq!(publisher.publish(post.id).await.unwrap(), PublishOutcome::Published);
        assert_eq!(
            publisher.publish(post.id).await.unwrap(),
            PublishOutcome::AlreadyPosted
        );

        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Posted);
        assert_eq!(notifier.events().await, vec![StatusEvent::posted(post.id)]);
    }

    #[tokio::test]
    async fn missing_post_is_a_silent_no_op() {
        let posts = Arc::new(MemoryPosts::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let outcome = handler(&posts, &notifier).publish(99).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Missing);
        assert!(notifier.events().await.is_empty());
    }

    #[tokio::test]
    async fn notifier_failure_does_not_undo_commit() {
        let posts = Arc::new(MemoryPosts::default());
        let notifier = Arc::new(RecordingNotifier::failing());
        let post = posts.insert(new_post("A", -60)).await;

        let outcome = handler(&posts, &notifier).publish(post.id).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Published);
        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Posted);
    }

    #[tokio::test]
    async fn task_handler_maps_outcomes() {
        let posts = Arc::new(MemoryPosts::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let post = posts.insert(new_post("A", -60)).await;
        let run = handler(&posts, &notifier).task_handler();

        let task = ScheduledTask::publish_post(post.id, post.scheduled_time);
        assert_eq!(run(task.clone()).await, TaskOutcome::Completed);
        assert!(matches!(run(task).await, TaskOutcome::Skipped(_)));

        let bad = ScheduledTask::new("post_x", PUBLISH_POST, serde_json::json!({}), post.scheduled_time);
        assert!(matches!(run(bad).await, TaskOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn post_is_not_published_before_its_time() {
        let posts = Arc::new(MemoryPosts::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let post = posts.insert(new_post("later", 3600)).await;
        let publisher = handler(&posts, &notifier);

        assert_eq!(publisher.publish(post.id).await.unwrap(), PublishOutcome::NotDue);

        let run = publisher.task_handler();
        let early = ScheduledTask::publish_post(post.id, post.scheduled_time);
        assert!(matches!(run(early).await, TaskOutcome::Skipped(_)));

        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Scheduled);
        assert!(notifier.events().await.is_empty());
    }
}
