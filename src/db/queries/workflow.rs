use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::{PgPool, QueryBuilder};

use crate::api::auth::Claims;
use crate::audit;
use crate::db::models::user::UserRole;
use crate::db::models::workflow::{
    NewWorkflow, PatchWorkflow, StatusUpdate, UpdateWorkflow, Workflow, WorkflowStatus,
};
use crate::errors::ApiError;
use crate::middleware::auth::require_role;
use crate::utils::api_response::ApiResponse;

async fn fetch_workflow(pool: &PgPool, id: i64) -> Result<Workflow, ApiError> {
    sqlx::query_as::<_, Workflow>("SELECT * FROM workflows WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Workflow".into()))
}

#[utoipa::path(
    post,
    path = "/workflows",
    request_body = NewWorkflow,
    responses(
        (status = 201, description = "Workflow created", body = Workflow),
        (status = 400, description = "Name and type are required"),
        (status = 403, description = "Insufficient role")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn create_workflow(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewWorkflow>,
) -> Result<ApiResponse<Workflow>, ApiError> {
    require_role(
        &claims,
        &[UserRole::Admin, UserRole::Management, UserRole::Operations],
    )?;

    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("name is required".into()))?;
    let wf_type = payload
        .wf_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("type is required".into()))?;
    let status = payload.status.unwrap_or(WorkflowStatus::Created);

    let workflow = sqlx::query_as::<_, Workflow>(
        "INSERT INTO workflows (name, wf_type, status, created_at, updated_at)
         VALUES ($1, $2, $3, NOW(), NOW())
         RETURNING *",
    )
    .bind(&name)
    .bind(&wf_type)
    .bind(status)
    .fetch_one(&pool)
    .await?;

    audit::record(
        &pool,
        Some(&claims),
        "CREATE_WORKFLOW",
        "Workflow",
        &workflow.id.to_string(),
        None,
        audit::snapshot(&workflow),
    )
    .await;

    Ok(ApiResponse::created("Workflow created", workflow))
}

#[utoipa::path(
    get,
    path = "/workflows",
    responses((status = 200, description = "List all workflows", body = [Workflow])),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn get_all_workflows(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Workflow>>, ApiError> {
    let workflows = sqlx::query_as::<_, Workflow>("SELECT * FROM workflows ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflows retrieved successfully",
        workflows,
    ))
}

#[utoipa::path(
    get,
    path = "/workflows/{id}",
    params(("id" = i64, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Retrieve a single workflow", body = Workflow),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn get_workflow(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Workflow>, ApiError> {
    let workflow = fetch_workflow(&pool, id).await?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflow retrieved successfully",
        workflow,
    ))
}

#[utoipa::path(
    get,
    path = "/workflows/status/{status}",
    params(("status" = WorkflowStatus, Path, description = "Workflow status")),
    responses((status = 200, description = "Workflows with the given status", body = [Workflow])),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn get_workflows_by_status(
    State(pool): State<PgPool>,
    Path(status): Path<WorkflowStatus>,
) -> Result<ApiResponse<Vec<Workflow>>, ApiError> {
    let workflows =
        sqlx::query_as::<_, Workflow>("SELECT * FROM workflows WHERE status = $1 ORDER BY id")
            .bind(status)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflows retrieved successfully",
        workflows,
    ))
}

#[utoipa::path(
    put,
    path = "/workflows/{id}",
    request_body = UpdateWorkflow,
    params(("id" = i64, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow updated", body = Workflow),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn update_workflow(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateWorkflow>,
) -> Result<ApiResponse<Workflow>, ApiError> {
    let previous = fetch_workflow(&pool, id).await?;

    let workflow = sqlx::query_as::<_, Workflow>(
        "UPDATE workflows SET name = $2, wf_type = $3, status = $4, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.wf_type)
    .bind(payload.status)
    .fetch_one(&pool)
    .await?;

    audit::record(
        &pool,
        Some(&claims),
        "UPDATE_WORKFLOW",
        "Workflow",
        &id.to_string(),
        Some(audit::snapshot(&previous)),
        audit::snapshot(&workflow),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflow updated successfully",
        workflow,
    ))
}

/// Partial field-map update (status/name/type only). Status transitions are
/// not validated; any status may follow any other.
#[utoipa::path(
    patch,
    path = "/workflows/{id}",
    request_body = PatchWorkflow,
    params(("id" = i64, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow patched", body = Workflow),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn patch_workflow(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(patch): Json<PatchWorkflow>,
) -> Result<ApiResponse<Workflow>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::Validation("No fields provided for update".into()));
    }

    let previous = fetch_workflow(&pool, id).await?;

    let mut query_builder = QueryBuilder::new("UPDATE workflows SET ");
    let mut first = true;

    if let Some(name) = &patch.name {
        query_builder.push("name = ").push_bind(name);
        first = false;
    }
    if let Some(wf_type) = &patch.wf_type {
        if !first {
            query_builder.push(", ");
        }
        query_builder.push("wf_type = ").push_bind(wf_type);
        first = false;
    }
    if let Some(status) = patch.status {
        if !first {
            query_builder.push(", ");
        }
        query_builder.push("status = ").push_bind(status);
    }
    query_builder.push(", updated_at = NOW() WHERE id = ");
    query_builder.push_bind(id);
    query_builder.push(" RETURNING *");

    let workflow: Workflow = query_builder.build_query_as().fetch_one(&pool).await?;

    audit::record(
        &pool,
        Some(&claims),
        "UPDATE_WORKFLOW",
        "Workflow",
        &id.to_string(),
        Some(audit::snapshot(&previous)),
        audit::snapshot(&workflow),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflow updated successfully",
        workflow,
    ))
}

#[utoipa::path(
    patch,
    path = "/workflows/{id}/status",
    request_body = StatusUpdate,
    params(("id" = i64, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Status updated", body = Workflow),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn update_workflow_status(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<ApiResponse<Workflow>, ApiError> {
    let previous = fetch_workflow(&pool, id).await?;

    let workflow = sqlx::query_as::<_, Workflow>(
        "UPDATE workflows SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(body.status)
    .fetch_one(&pool)
    .await?;

    audit::record(
        &pool,
        Some(&claims),
        "UPDATE_WORKFLOW_STATUS",
        "Workflow",
        &id.to_string(),
        Some(previous.status.to_string()),
        workflow.status.to_string(),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflow status updated successfully",
        workflow,
    ))
}

/// Deletes the workflow row only. Approvals referencing the id are left
/// dangling, matching the upstream contract.
#[utoipa::path(
    delete,
    path = "/workflows/{id}",
    params(("id" = i64, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow deleted"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Workflows",
    security(("bearerAuth" = []))
)]
pub async fn delete_workflow(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    require_role(&claims, &[UserRole::Admin, UserRole::Management])?;

    let previous = fetch_workflow(&pool, id).await?;

    sqlx::query("DELETE FROM workflows WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    audit::record(
        &pool,
        Some(&claims),
        "DELETE_WORKFLOW",
        "Workflow",
        &id.to_string(),
        Some(audit::snapshot(&previous)),
        "DELETED".to_string(),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Workflow deleted successfully",
        (),
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_workflow,
        get_all_workflows,
        get_workflow,
        get_workflows_by_status,
        update_workflow,
        patch_workflow,
        update_workflow_status,
        delete_workflow
    ),
    components(schemas(Workflow, NewWorkflow, UpdateWorkflow, PatchWorkflow, StatusUpdate)),
    tags((name = "Workflows", description = "Workflow Management API"))
)]
pub struct WorkflowDoc;
