//! Domain entities - the core business objects.

mod clock;
mod post;
mod task;

pub use clock::SchedulerClock;
pub use post::{NewPost, Post, PostChanges, PostId, PostStatus};
pub use task::{PUBLISH_POST, ScheduledTask, StatusEvent, task_id_for_post};
