use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;

use crate::api::auth::Claims;
use crate::audit;
use crate::db::models::approval::{Approval, ApprovalDecision, ApprovalStatus, NewApproval};
use crate::errors::ApiError;
use crate::utils::api_response::ApiResponse;

/// Creates an approval for a workflow. The workflow id is not checked
/// against the workflows table; dangling references are accepted.
#[utoipa::path(
    post,
    path = "/approvals",
    request_body = NewApproval,
    responses((status = 201, description = "Approval created", body = Approval)),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn create_approval(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewApproval>,
) -> Result<ApiResponse<Approval>, ApiError> {
    let status = payload.status.unwrap_or(ApprovalStatus::Pending);

    let approval = sqlx::query_as::<_, Approval>(
        "INSERT INTO approvals (workflow_id, status, assigned_to, approved_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, NOW(), NOW())
         RETURNING *",
    )
    .bind(payload.workflow_id)
    .bind(status)
    .bind(&payload.assigned_to)
    .bind(&payload.approved_by)
    .fetch_one(&pool)
    .await?;

    audit::record(
        &pool,
        Some(&claims),
        "CREATE_APPROVAL",
        "Approval",
        &approval.id.to_string(),
        None,
        audit::snapshot(&approval),
    )
    .await;

    Ok(ApiResponse::created("Approval created", approval))
}

#[utoipa::path(
    get,
    path = "/approvals",
    responses((status = 200, description = "List all approvals", body = [Approval])),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn get_all_approvals(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Approval>>, ApiError> {
    let approvals = sqlx::query_as::<_, Approval>("SELECT * FROM approvals ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Approvals retrieved successfully",
        approvals,
    ))
}

#[utoipa::path(
    get,
    path = "/approvals/pending",
    responses((status = 200, description = "Pending approvals", body = [Approval])),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn get_pending_approvals(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Approval>>, ApiError> {
    let approvals =
        sqlx::query_as::<_, Approval>("SELECT * FROM approvals WHERE status = $1 ORDER BY id")
            .bind(ApprovalStatus::Pending)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Pending approvals retrieved successfully",
        approvals,
    ))
}

#[utoipa::path(
    get,
    path = "/approvals/{id}",
    params(("id" = i64, Path, description = "Approval ID")),
    responses(
        (status = 200, description = "Retrieve a single approval", body = Approval),
        (status = 404, description = "Approval not found")
    ),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn get_approval(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Approval>, ApiError> {
    let approval = sqlx::query_as::<_, Approval>("SELECT * FROM approvals WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Approval".into()))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Approval retrieved successfully",
        approval,
    ))
}

#[utoipa::path(
    get,
    path = "/approvals/workflow/{workflow_id}",
    params(("workflow_id" = i64, Path, description = "Workflow ID")),
    responses((status = 200, description = "Approvals for the workflow", body = [Approval])),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn get_approvals_by_workflow(
    State(pool): State<PgPool>,
    Path(workflow_id): Path<i64>,
) -> Result<ApiResponse<Vec<Approval>>, ApiError> {
    let approvals =
        sqlx::query_as::<_, Approval>("SELECT * FROM approvals WHERE workflow_id = $1 ORDER BY id")
            .bind(workflow_id)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Approvals retrieved successfully",
        approvals,
    ))
}

#[utoipa::path(
    get,
    path = "/approvals/assignee/{assignee}",
    params(("assignee" = String, Path, description = "Assignee name")),
    responses((status = 200, description = "Approvals assigned to the given user", body = [Approval])),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn get_approvals_by_assignee(
    State(pool): State<PgPool>,
    Path(assignee): Path<String>,
) -> Result<ApiResponse<Vec<Approval>>, ApiError> {
    let approvals =
        sqlx::query_as::<_, Approval>("SELECT * FROM approvals WHERE assigned_to = $1 ORDER BY id")
            .bind(&assignee)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Approvals retrieved successfully",
        approvals,
    ))
}

/// Decides an approval. The rejection reason is stored only when non-empty;
/// `updated_at` is restamped on every call.
#[utoipa::path(
    patch,
    path = "/approvals/{id}",
    request_body = ApprovalDecision,
    params(("id" = i64, Path, description = "Approval ID")),
    responses(
        (status = 200, description = "Approval updated", body = Approval),
        (status = 400, description = "Status is required"),
        (status = 404, description = "Approval not found")
    ),
    tag = "Approvals",
    security(("bearerAuth" = []))
)]
pub async fn update_approval(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> Result<ApiResponse<Approval>, ApiError> {
    let status = decision
        .status
        .ok_or_else(|| ApiError::Validation("status is required".into()))?;

    let previous = sqlx::query_as::<_, Approval>("SELECT * FROM approvals WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Approval".into()))?;

    let reason = decision.reason.filter(|r| !r.is_empty());
    let approval = match reason {
        Some(reason) => {
            sqlx::query_as::<_, Approval>(
                "UPDATE approvals SET status = $2, rejection_reason = $3, updated_at = NOW()
                 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(status)
            .bind(reason)
            .fetch_one(&pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Approval>(
                "UPDATE approvals SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(status)
            .fetch_one(&pool)
            .await?
        }
    };

    audit::record(
        &pool,
        Some(&claims),
        "UPDATE_APPROVAL",
        "Approval",
        &id.to_string(),
        Some(audit::snapshot(&previous)),
        audit::snapshot(&approval),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Approval updated successfully",
        approval,
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_approval,
        get_all_approvals,
        get_pending_approvals,
        get_approval,
        get_approvals_by_workflow,
        get_approvals_by_assignee,
        update_approval
    ),
    components(schemas(Approval, NewApproval, ApprovalDecision)),
    tags((name = "Approvals", description = "Approval Management API"))
)]
pub struct ApprovalDoc;
