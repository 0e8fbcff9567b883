use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::workflow::*;

pub fn workflow_routes() -> Router<PgPool> {
    Router::new()
        .route("/workflows", post(create_workflow))
        .route("/workflows", get(get_all_workflows))
        .route("/workflows/{id}", get(get_workflow))
        .route("/workflows/{id}", put(update_workflow))
        .route("/workflows/{id}", patch(patch_workflow))
        .route("/workflows/{id}", delete(delete_workflow))
        .route("/workflows/{id}/status", patch(update_workflow_status))
        .route("/workflows/status/{status}", get(get_workflows_by_status))
}
