use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::post::{PostId, PostStatus};

/// Callback identity of the publish handler.
pub const PUBLISH_POST: &str = "publish_post";

/// Task id for a post's publish registration.
///
/// Stable across edits, so registering again replaces the previous entry.
pub fn task_id_for_post(post_id: PostId) -> String {
    format!("post_{post_id}")
}

/// A one-shot registration in the delayed task scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique task identifier. Re-registering an id replaces the entry.
    pub id: String,
    /// Name of the handler to invoke.
    pub callback: String,
    /// Arguments passed to the handler.
    pub payload: serde_json::Value,
    /// Fire at or after this instant.
    pub fire_at: DateTime<FixedOffset>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledTask {
    pub fn new(
        id: impl Into<String>,
        callback: impl Into<String>,
        payload: serde_json::Value,
        fire_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            callback: callback.into(),
            payload,
            fire_at,
            created_at: Utc::now(),
        }
    }

    /// The publish registration for a post.
    pub fn publish_post(post_id: PostId, fire_at: DateTime<FixedOffset>) -> Self {
        Self::new(
            task_id_for_post(post_id),
            PUBLISH_POST,
            serde_json::json!({ "post_id": post_id }),
            fire_at,
        )
    }

    /// The post id argument of a publish registration.
    pub fn post_id(&self) -> Option<PostId> {
        self.payload
            .get("post_id")
            .and_then(serde_json::Value::as_i64)
            .and_then(|id| PostId::try_from(id).ok())
    }

    pub fn is_due(&self, now: DateTime<FixedOffset>) -> bool {
        self.fire_at <= now
    }
}

/// Status change broadcast to connected viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub post_id: PostId,
    pub status: PostStatus,
}

impl StatusEvent {
    pub fn posted(post_id: PostId) -> Self {
        Self {
            post_id,
            status: PostStatus::Posted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_is_stable() {
        assert_eq!(task_id_for_post(42), "post_42");
        assert_eq!(task_id_for_post(42), task_id_for_post(42));
    }

    #[test]
    fn publish_task_carries_post_id() {
        let fire_at = DateTime::parse_from_rfc3339("2025-03-01T09:30:00+05:30").unwrap();
        let task = ScheduledTask::publish_post(7, fire_at);

        assert_eq!(task.id, "post_7");
        assert_eq!(task.callback, PUBLISH_POST);
        assert_eq!(task.post_id(), Some(7));
        assert!(task.is_due(fire_at));
        assert!(!task.is_due(fire_at - chrono::Duration::seconds(1)));
    }

    #[test]
    fn status_event_wire_shape() {
        let json = serde_json::to_value(StatusEvent::posted(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "post_id": 3, "status": "posted" }));
    }
}
