mod common;

use axum::http::StatusCode;
use sqlx::PgPool;
use tower::util::ServiceExt;

use common::{app_with_pool, body_json, get, json_request, token_for};

// Each test runs against its own throwaway database with the migrations
// applied, so rows created here never leak between tests.

#[sqlx::test]
async fn inserted_rows_get_default_statuses(pool: PgPool) {
    let app = app_with_pool(pool);
    let token = token_for("MANAGEMENT");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/workflows",
            Some(&token),
            r#"{"name":"Quarterly budget","type":"FINANCE"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let workflow = body_json(response).await;
    assert_eq!(workflow["data"]["status"], "CREATED");
    let workflow_id = workflow["data"]["id"].as_i64().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/approvals",
            Some(&token),
            &format!(r#"{{"workflowId":{workflow_id},"assignedTo":"finance-lead"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let approval = body_json(response).await;
    assert_eq!(approval["data"]["status"], "PENDING");
}

#[sqlx::test]
async fn deciding_unknown_approval_is_not_found_and_writes_nothing(pool: PgPool) {
    let app = app_with_pool(pool.clone());
    let token = token_for("MANAGEMENT");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/approvals",
            Some(&token),
            r#"{"workflowId":1,"assignedTo":"ops"}"#,
        ))
        .await
        .unwrap();
    let seeded = body_json(response).await;
    let seeded_id = seeded["data"]["id"].as_i64().unwrap();

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/approvals/999999",
            Some(&token),
            r#"{"status":"APPROVED","reason":"late filing"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "NOT_FOUND");

    // The failed decision must not have touched the one existing row,
    // nor created anything.
    let (status, reason): (String, Option<String>) =
        sqlx::query_as("SELECT status, rejection_reason FROM approvals WHERE id = $1")
            .bind(seeded_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "PENDING");
    assert!(reason.is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approvals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn workflow_status_patch_keeps_the_id(pool: PgPool) {
    let app = app_with_pool(pool);
    let token = token_for("OPERATIONS");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/workflows",
            Some(&token),
            r#"{"name":"Vendor onboarding","type":"PROCUREMENT"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/workflows/{id}/status"),
            Some(&token),
            r#"{"status":"REVIEW"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await;
    assert_eq!(patched["data"]["id"].as_i64(), Some(id));
    assert_eq!(patched["data"]["status"], "REVIEW");

    let response = app
        .oneshot(get(&format!("/workflows/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["id"].as_i64(), Some(id));
    assert_eq!(fetched["data"]["status"], "REVIEW");
}

#[sqlx::test]
async fn audit_paging_tolerates_a_huge_page_index(pool: PgPool) {
    let app = app_with_pool(pool);
    let token = token_for("ADMIN");

    // page * size would overflow i64 here; the offset saturates instead.
    let response = app
        .oneshot(get(
            "/auditLogs?page=9223372036854775807&size=100",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 0);
}

#[sqlx::test]
async fn deactivation_is_only_reported_after_a_password_match(pool: PgPool) {
    let app = app_with_pool(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            r#"{"firstName":"Ada","lastName":"Byron","username":"ada",
                "email":"ada@example.com","password":"correct-horse"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    sqlx::query("UPDATE users SET active = FALSE WHERE email = $1")
        .bind("ada@example.com")
        .execute(&pool)
        .await
        .unwrap();

    // Wrong password: indistinguishable from any other bad credential.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"ada@example.com","password":"wrong"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "INVALID_CREDENTIALS");

    // Right password: the account state is disclosed.
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"ada@example.com","password":"correct-horse"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "FORBIDDEN");
}
