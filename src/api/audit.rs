use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::audit::*;

pub fn audit_routes() -> Router<PgPool> {
    Router::new()
        .route("/auditLogs", get(get_audit_logs))
        .route("/auditLogs", post(create_audit_log))
        .route("/auditLogs/{id}", get(get_audit_log))
        .route("/auditLogs/{id}", delete(delete_audit_log))
}
