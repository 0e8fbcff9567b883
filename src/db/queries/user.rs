use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::{PgPool, QueryBuilder};

use crate::api::auth::Claims;
use crate::audit;
use crate::db::models::user::{UpdateRole, UpdateUser, User, UserRole};
use crate::errors::ApiError;
use crate::middleware::auth::{require_role, require_self_or};
use crate::utils::api_response::ApiResponse;

// User creation is handled by auth/registration.

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "List all users", body = [User]),
        (status = 403, description = "Insufficient role")
    ),
    tag = "Users",
    security(("bearerAuth" = []))
)]
pub async fn get_all_users(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<Vec<User>>, ApiError> {
    require_role(&claims, &[UserRole::Admin, UserRole::Management])?;

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Users retrieved successfully",
        users,
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Retrieve a single user", body = User),
        (status = 403, description = "Not self and insufficient role"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearerAuth" = []))
)]
pub async fn get_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<User>, ApiError> {
    require_self_or(&claims, id, &[UserRole::Admin, UserRole::Management])?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "User retrieved successfully",
        user,
    ))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UpdateUser,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, description = "No fields provided for update"),
        (status = 403, description = "Not self and not an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearerAuth" = []))
)]
pub async fn update_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateUser>,
) -> Result<ApiResponse<User>, ApiError> {
    require_self_or(&claims, id, &[UserRole::Admin])?;

    if update.is_empty() {
        return Err(ApiError::Validation("No fields provided for update".into()));
    }

    let previous = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    let mut query_builder = QueryBuilder::new("UPDATE users SET ");
    let mut first = true; // Controls comma placement

    if let Some(first_name) = &update.first_name {
        query_builder.push("first_name = ").push_bind(first_name);
        first = false;
    }
    if let Some(last_name) = &update.last_name {
        if !first {
            query_builder.push(", ");
        }
        query_builder.push("last_name = ").push_bind(last_name);
        first = false;
    }
    if let Some(department) = &update.department {
        if !first {
            query_builder.push(", ");
        }
        query_builder.push("department = ").push_bind(department);
    }
    query_builder.push(", updated_at = NOW() WHERE id = ");
    query_builder.push_bind(id);
    query_builder.push(" RETURNING *");

    let user: User = query_builder.build_query_as().fetch_one(&pool).await?;

    audit::record(
        &pool,
        Some(&claims),
        "UPDATE_USER",
        "User",
        &id.to_string(),
        Some(audit::snapshot(&previous)),
        audit::snapshot(&user),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "User updated successfully",
        user,
    ))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/role",
    request_body = UpdateRole,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Role updated successfully", body = User),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearerAuth" = []))
)]
pub async fn update_role(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRole>,
) -> Result<ApiResponse<User>, ApiError> {
    require_role(&claims, &[UserRole::Admin])?;

    let previous = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(body.role)
    .fetch_one(&pool)
    .await?;

    audit::record(
        &pool,
        Some(&claims),
        "UPDATE_ROLE",
        "User",
        &id.to_string(),
        Some(previous.role.to_string()),
        user.role.to_string(),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Role updated successfully",
        user,
    ))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearerAuth" = []))
)]
pub async fn delete_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    require_role(&claims, &[UserRole::Admin])?;

    let previous = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    // Hard delete; approvals and audit rows referencing this user stay put.
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    audit::record(
        &pool,
        Some(&claims),
        "DELETE_USER",
        "User",
        &id.to_string(),
        Some(audit::snapshot(&previous)),
        "DELETED".to_string(),
    )
    .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "User deleted successfully",
        (),
    ))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(get_all_users, get_user, update_user, update_role, delete_user),
    components(schemas(User, UpdateUser, UpdateRole)),
    tags((name = "Users", description = "User Management API"))
)]
pub struct UserDoc;
