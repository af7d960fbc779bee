use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Store-assigned post identifier.
pub type PostId = i32;

const MAX_TITLE_LEN: usize = 200;
const MAX_PLATFORM_LEN: usize = 50;

/// Lifecycle of a post. Only moves forward: `Scheduled` -> `Posted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Scheduled,
    Posted,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Scheduled => "scheduled",
            PostStatus::Posted => "posted",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(PostStatus::Scheduled),
            "posted" => Ok(PostStatus::Posted),
            other => Err(DomainError::Validation(format!(
                "unknown post status '{other}'"
            ))),
        }
    }
}

/// Post entity - a piece of content waiting for its publish time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub platform: String,
    /// Do not publish before this instant.
    pub scheduled_time: DateTime<FixedOffset>,
    pub status: PostStatus,
    /// Name of an uploaded image in the file store, if any.
    pub image_filename: Option<String>,
}

impl Post {
    pub fn is_scheduled(&self) -> bool {
        self.status == PostStatus::Scheduled
    }

    /// Apply an edit. Returns the previous image name when the edit replaced it.
    pub fn apply(&mut self, changes: PostChanges) -> Option<String> {
        self.title = changes.title;
        self.content = changes.content;
        self.platform = changes.platform;
        self.scheduled_time = changes.scheduled_time;

        match changes.image_filename {
            Some(new_image) if self.image_filename.as_deref() != Some(new_image.as_str()) => {
                self.image_filename.replace(new_image)
            }
            _ => None,
        }
    }
}

/// Fields needed to create a post. New posts always start `Scheduled`.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub platform: String,
    pub scheduled_time: DateTime<FixedOffset>,
    pub image_filename: Option<String>,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.title, &self.content, &self.platform)
    }
}

/// An edit of an existing post. `image_filename: None` keeps the current image.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub platform: String,
    pub scheduled_time: DateTime<FixedOffset>,
    pub image_filename: Option<String>,
}

impl PostChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.title, &self.content, &self.platform)
    }
}

fn validate_fields(title: &str, content: &str, platform: &str) -> Result<(), DomainError> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(format!("title must be at most {MAX_TITLE_LEN} characters"));
    }
    if content.trim().is_empty() {
        errors.push("content is required".to_string());
    }
    if platform.trim().is_empty() {
        errors.push("platform is required".to_string());
    } else if platform.chars().count() > MAX_PLATFORM_LEN {
        errors.push(format!(
            "platform must be at most {MAX_PLATFORM_LEN} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors.join(", ")))
    }
}
