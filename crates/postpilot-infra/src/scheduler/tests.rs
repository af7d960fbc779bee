//! The delayed scheduler driving the real publish path end to end.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::sync::broadcast;
use tokio::time::timeout;

use postpilot_core::domain::{
    NewPost, PUBLISH_POST, Post, PostChanges, PostStatus, ScheduledTask, SchedulerClock,
    StatusEvent, task_id_for_post,
};
use postpilot_core::ports::{BaseRepository, PostRepository, TaskScheduler, TaskStore};
use postpilot_core::services::{MutationLock, PostService, PublishHandler, Reconciler};

use crate::database::InMemoryPostRepository;
use crate::files::LocalFileStore;
use crate::notify::BroadcastNotifier;
use crate::scheduler::{DelayedSchedulerConfig, DelayedTaskScheduler, InMemoryTaskStore};

struct Harness {
    posts: Arc<InMemoryPostRepository>,
    store: Arc<InMemoryTaskStore>,
    scheduler: Arc<DelayedTaskScheduler>,
    service: PostService,
    reconciler: Reconciler,
    events: broadcast::Receiver<StatusEvent>,
    _uploads: tempfile::TempDir,
}

async fn harness_over(posts: Arc<InMemoryPostRepository>, store: Arc<InMemoryTaskStore>) -> Harness {
    let clock = SchedulerClock::default();
    let notifier = Arc::new(BroadcastNotifier::default());
    let events = notifier.subscribe();
    let scheduler = Arc::new(DelayedTaskScheduler::new(
        store.clone(),
        clock,
        DelayedSchedulerConfig {
            poll_interval: Duration::from_millis(20),
        },
    ));

    let publisher = Arc::new(PublishHandler::new(posts.clone(), notifier, clock));
    scheduler
        .register_handler(PUBLISH_POST, publisher.task_handler())
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let files = Arc::new(LocalFileStore::new(uploads.path()).await.unwrap());
    let lock = MutationLock::default();
    let service = PostService::new(posts.clone(), scheduler.clone(), files, lock.clone());
    let reconciler = Reconciler::new(posts.clone(), scheduler.clone(), publisher, clock, lock);

    Harness {
        posts,
        store,
        scheduler,
        service,
        reconciler,
        events,
        _uploads: uploads,
    }
}

async fn harness() -> Harness {
    harness_over(
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryTaskStore::new()),
    )
    .await
}

fn at(millis: i64) -> chrono::DateTime<chrono::FixedOffset> {
    SchedulerClock::default().now() + ChronoDuration::milliseconds(millis)
}

fn draft(title: &str, millis: i64) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("{title} content"),
        platform: "twitter".to_string(),
        scheduled_time: at(millis),
        image_filename: None,
    }
}

fn moved(post: &Post, millis: i64) -> PostChanges {
    PostChanges {
        title: post.title.clone(),
        content: post.content.clone(),
        platform: post.platform.clone(),
        scheduled_time: at(millis),
        image_filename: None,
    }
}

async fn next_event(events: &mut broadcast::Receiver<StatusEvent>) -> StatusEvent {
    timeout(Duration::from_secs(3), events.recv())
        .await
        .expect("a status event should arrive")
        .unwrap()
}

async fn assert_no_more_events(events: &mut broadcast::Receiver<StatusEvent>) {
    assert!(
        timeout(Duration::from_millis(300), events.recv()).await.is_err(),
        "no further status event expected"
    );
}

#[tokio::test]
async fn edited_post_publishes_once_at_its_new_time() {
    let mut h = harness().await;
    h.scheduler.start().await.unwrap();

    let post = h.service.create(draft("A", 3_600_000)).await.unwrap();
    let edited = h.service.edit(post.id, moved(&post, 150)).await.unwrap();

    assert_eq!(next_event(&mut h.events).await, StatusEvent::posted(post.id));
    assert!(SchedulerClock::default().now() >= edited.scheduled_time);
    assert_no_more_events(&mut h.events).await;

    let stored = h.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PostStatus::Posted);
    assert_eq!(h.scheduler.pending().await, 0);
    assert!(h.store.get(&task_id_for_post(post.id)).await.unwrap().is_none());
    h.scheduler.shutdown().await;
}

#[tokio::test]
async fn each_post_fires_exactly_once() {
    let mut h = harness().await;
    h.scheduler.start().await.unwrap();

    let first = h.service.create(draft("first", 100)).await.unwrap();
    let second = h.service.create(draft("second", 250)).await.unwrap();
    // Re-registering the same time must not add a second fire.
    let same_time = PostChanges {
        scheduled_time: second.scheduled_time,
        ..moved(&second, 0)
    };
    h.service.edit(second.id, same_time).await.unwrap();

    assert_eq!(next_event(&mut h.events).await, StatusEvent::posted(first.id));
    assert_eq!(next_event(&mut h.events).await, StatusEvent::posted(second.id));
    assert_no_more_events(&mut h.events).await;
    assert_eq!(h.scheduler.pending().await, 0);
    h.scheduler.shutdown().await;
}

#[tokio::test]
async fn deleted_post_never_publishes() {
    let mut h = harness().await;
    h.scheduler.start().await.unwrap();

    let post = h.service.create(draft("A", 150)).await.unwrap();
    h.service.delete(post.id).await.unwrap();

    assert_no_more_events(&mut h.events).await;
    assert_eq!(h.scheduler.pending().await, 0);
    h.scheduler.shutdown().await;
}

#[tokio::test]
async fn startup_reconciliation_then_restore_publishes_overdue_post_once() {
    let posts = Arc::new(InMemoryPostRepository::new());
    let store = Arc::new(InMemoryTaskStore::new());

    // State left behind by a previous process: an overdue post with its row,
    // and a future post whose row still carries an earlier fire time.
    let overdue = posts.create(draft("overdue", -60_000)).await.unwrap();
    store
        .upsert(&ScheduledTask::publish_post(overdue.id, overdue.scheduled_time))
        .await
        .unwrap();
    let future = posts.create(draft("future", 3_600_000)).await.unwrap();
    store
        .upsert(&ScheduledTask::publish_post(future.id, at(100)))
        .await
        .unwrap();

    let mut h = harness_over(posts, store).await;
    let report = h.reconciler.run_startup().await;
    assert_eq!(report.published, 1);
    assert_eq!(report.rearmed, 1);
    assert_eq!(next_event(&mut h.events).await, StatusEvent::posted(overdue.id));

    assert_eq!(h.scheduler.start().await.unwrap(), 0);
    assert_no_more_events(&mut h.events).await;

    assert!(h.store.get(&task_id_for_post(overdue.id)).await.unwrap().is_none());
    let live = h.scheduler.get(&task_id_for_post(future.id)).await.unwrap();
    assert_eq!(live.fire_at, future.scheduled_time);
    let stored = h.posts.find_by_id(future.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PostStatus::Scheduled);
    h.scheduler.shutdown().await;
}
