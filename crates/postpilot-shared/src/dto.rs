//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to create a scheduled post.
///
/// `scheduled_time` is RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` read in
/// the scheduler's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub platform: String,
    pub scheduled_time: String,
    /// Name returned by a previous upload.
    #[serde(default)]
    pub image_filename: Option<String>,
}

/// Request to edit a post. Every field is replaced; omitting
/// `image_filename` keeps the current image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    pub platform: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub image_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub platform: String,
    /// RFC 3339 in the scheduler's offset.
    pub scheduled_time: String,
    pub status: String,
    pub image_filename: Option<String>,
    /// Path the image is served from, when there is one.
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
}
