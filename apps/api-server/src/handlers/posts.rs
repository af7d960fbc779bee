//! Post handlers.

use actix_web::{HttpResponse, web};

use postpilot_core::domain::{NewPost, Post, PostChanges, PostId, SchedulerClock};
use postpilot_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Times are rendered in the scheduler's offset, whatever the store returned.
fn to_response(clock: SchedulerClock, post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        image_url: post
            .image_filename
            .as_ref()
            .map(|name| format!("/uploads/{name}")),
        title: post.title,
        content: post.content,
        platform: post.platform,
        scheduled_time: clock.normalize(post.scheduled_time).to_rfc3339(),
        status: post.status.to_string(),
        image_filename: post.image_filename,
    }
}

/// A blank image field from a form means "no image".
fn image_field(image: Option<String>) -> Option<String> {
    image.filter(|name| !name.trim().is_empty())
}

fn parse_time(state: &AppState, input: &str) -> AppResult<chrono::DateTime<chrono::FixedOffset>> {
    state
        .clock
        .parse(input)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    let body: Vec<PostResponse> = posts
        .into_iter()
        .map(|post| to_response(state.clock, post))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<PostId>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(to_response(state.clock, post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let scheduled_time = parse_time(&state, &req.scheduled_time)?;

    let post = state
        .posts
        .create(NewPost {
            title: req.title,
            content: req.content,
            platform: req.platform,
            scheduled_time,
            image_filename: image_field(req.image_filename),
        })
        .await?;

    Ok(HttpResponse::Created().json(to_response(state.clock, post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let scheduled_time = parse_time(&state, &req.scheduled_time)?;

    let post = state
        .posts
        .edit(
            path.into_inner(),
            PostChanges {
                title: req.title,
                content: req.content,
                platform: req.platform,
                scheduled_time,
                image_filename: image_field(req.image_filename),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(to_response(state.clock, post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
