use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::approval::*;

pub fn approval_routes() -> Router<PgPool> {
    Router::new()
        .route("/approvals", post(create_approval))
        .route("/approvals", get(get_all_approvals))
        .route("/approvals/pending", get(get_pending_approvals))
        .route("/approvals/{id}", get(get_approval))
        .route("/approvals/{id}", patch(update_approval))
        .route("/approvals/workflow/{workflow_id}", get(get_approvals_by_workflow))
        .route("/approvals/assignee/{assignee}", get(get_approvals_by_assignee))
}
