mod common;

use axum::http::StatusCode;
use tower::util::ServiceExt;

use common::{body_json, get, json_request, setup_app, token_for};

// Guards and request validation run before any query, so none of these
// requests reach the (unreachable) database.

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = setup_app();
    let response = app.oneshot(get("/workflows", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = setup_app();
    let response = app
        .oneshot(get("/workflows", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_role_cannot_create_workflows() {
    let app = setup_app();
    let token = token_for("USER");
    let response = app
        .oneshot(json_request(
            "POST",
            "/workflows",
            Some(&token),
            r#"{"name":"Q1 Budget","type":"FINANCE"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn operations_cannot_list_users() {
    let app = setup_app();
    let token = token_for("OPERATIONS");
    let response = app.oneshot(get("/users", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn management_cannot_change_roles() {
    let app = setup_app();
    let token = token_for("MANAGEMENT");
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/users/5/role",
            Some(&token),
            r#"{"role":"ADMIN"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn workflow_create_requires_name_and_type() {
    let app = setup_app();
    let token = token_for("OPERATIONS");
    let response = app
        .oneshot(json_request(
            "POST",
            "/workflows",
            Some(&token),
            r#"{"type":"FINANCE"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "VALIDATION");
}

#[tokio::test]
async fn approval_decision_requires_a_status() {
    let app = setup_app();
    let token = token_for("MANAGEMENT");
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/approvals/9",
            Some(&token),
            r#"{"reason":"missing paperwork"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["errors"]["kind"], "VALIDATION");
}

#[tokio::test]
async fn unknown_approval_status_is_rejected_at_the_boundary() {
    let app = setup_app();
    let token = token_for("MANAGEMENT");
    let response = app
        .oneshot(json_request(
            "PATCH",
            "/approvals/9",
            Some(&token),
            r#"{"status":"WITHDRAWN"}"#,
        ))
        .await
        .unwrap();

    // Serde rejects the open-ended status string before the handler runs.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
