//! Image upload and download.

use actix_web::{HttpResponse, web};

use postpilot_shared::dto::UploadResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn content_type_for(name: &str) -> mime_guess::Mime {
    mime_guess::from_path(name).first_or_octet_stream()
}

/// POST /api/uploads/{filename}
///
/// The raw request body is the file. The stored (sanitized) name is returned
/// and is what a post's `image_filename` must reference.
pub async fn upload_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Upload body is empty".to_string()));
    }

    let filename = state.files.save(&path.into_inner(), &body).await?;
    tracing::info!(image = %filename, size = body.len(), "Image uploaded");

    Ok(HttpResponse::Created().json(UploadResponse {
        url: format!("/uploads/{filename}"),
        filename,
    }))
}

/// GET /uploads/{filename}
pub async fn serve_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let bytes = state.files.read(&name).await?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&name))
        .body(bytes))
}
