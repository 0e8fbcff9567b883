use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;

use crate::api::auth::Claims;
use crate::db::models::audit::{AuditLog, AuditPage, AuditQuery, NewAuditLog};
use crate::errors::ApiError;
use crate::utils::api_response::ApiResponse;

/// Paginated listing with a case-insensitive substring match on the entity
/// type.
#[utoipa::path(
    get,
    path = "/auditLogs",
    params(
        ("page" = i64, Query, description = "Zero-based page index"),
        ("size" = i64, Query, description = "Page size"),
        ("search" = String, Query, description = "Substring match on entity type")
    ),
    responses((status = 200, description = "Audit log page", body = AuditPage)),
    tag = "Audit",
    security(("bearerAuth" = []))
)]
pub async fn get_audit_logs(
    State(pool): State<PgPool>,
    Query(query): Query<AuditQuery>,
) -> Result<ApiResponse<AuditPage>, ApiError> {
    let page = query.page.max(0);
    let size = query.size.clamp(1, 100);
    let pattern = format!("%{}%", query.search);

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM audit_logs WHERE entity ILIKE $1",
    )
    .bind(&pattern)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, AuditLog>(
        "SELECT * FROM audit_logs WHERE entity ILIKE $1
         ORDER BY timestamp DESC, id DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(&pattern)
    .bind(size)
    .bind(page.saturating_mul(size))
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Audit logs retrieved successfully",
        AuditPage {
            items,
            page,
            size,
            total,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/auditLogs/{id}",
    params(("id" = i64, Path, description = "Audit log ID")),
    responses(
        (status = 200, description = "Retrieve a single audit log", body = AuditLog),
        (status = 404, description = "Audit log not found")
    ),
    tag = "Audit",
    security(("bearerAuth" = []))
)]
pub async fn get_audit_log(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<AuditLog>, ApiError> {
    let log = sqlx::query_as::<_, AuditLog>("SELECT * FROM audit_logs WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Audit log".into()))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Audit log retrieved successfully",
        log,
    ))
}

/// Manual append. The acting user and role come from the caller's token,
/// never from the request body.
#[utoipa::path(
    post,
    path = "/auditLogs",
    request_body = NewAuditLog,
    responses((status = 201, description = "Audit log created", body = AuditLog)),
    tag = "Audit",
    security(("bearerAuth" = []))
)]
pub async fn create_audit_log(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewAuditLog>,
) -> Result<ApiResponse<AuditLog>, ApiError> {
    let log = sqlx::query_as::<_, AuditLog>(
        "INSERT INTO audit_logs (user_name, role, action, entity, entity_id, previous_state, new_state, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
         RETURNING *",
    )
    .bind(&claims.email)
    .bind(&claims.role)
    .bind(&payload.action)
    .bind(&payload.entity)
    .bind(&payload.entity_id)
    .bind(&payload.previous_state)
    .bind(&payload.new_state)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created("Audit log created", log))
}

#[utoipa::path(
    delete,
    path = "/auditLogs/{id}",
    params(("id" = i64, Path, description = "Audit log ID")),
    responses(
        (status = 200, description = "Audit log deleted"),
        (status = 404, description = "Audit log not found")
    ),
    tag = "Audit",
    security(("bearerAuth" = []))
)]
pub async fn delete_audit_log(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    let result = sqlx::query("DELETE FROM audit_logs WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Audit log".into()));
    }

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Audit log deleted successfully",
        (),
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(get_audit_logs, get_audit_log, create_audit_log, delete_audit_log),
    components(schemas(AuditLog, NewAuditLog, AuditPage)),
    tags((name = "Audit", description = "Audit Log API"))
)]
pub struct AuditDoc;
