//! HTTP handlers for the blog API

pub mod auth;
pub mod posts;

use axum::Json;

use crate::models::HealthResponse;

/// Handler: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "blog-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}
