use axum::{routing::get, Json, Router};
use serde_json::json;
use sqlx::PgPool;

/// Defines health check routes. All three report UP without touching the
/// database; readiness gating on storage is handled by the deployment, not
/// the service.
pub fn health_routes() -> Router<PgPool> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP", "service": "Workflow Approval API" }))
}

async fn liveness_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

async fn readiness_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP", "ready": "true" }))
}
