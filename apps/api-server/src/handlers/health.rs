//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use postpilot_core::ports::TaskScheduler;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// Publish tasks waiting to fire.
    pub pending_tasks: usize,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: state.clock.now().to_rfc3339(),
        pending_tasks: state.scheduler.pending().await,
    };

    HttpResponse::Ok().json(response)
}
