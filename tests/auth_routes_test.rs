mod common;

use axum::http::StatusCode;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tower::util::ServiceExt;

use approval_backend::api::auth::{Claims, DEMO_EMAIL, DEMO_PASSWORD};
use approval_backend::config::Config;
use common::{body_json, json_request, setup_app, token_for};

#[tokio::test]
async fn demo_login_succeeds_with_management_role() {
    let app = setup_app();
    let body = format!(r#"{{"email":"{DEMO_EMAIL}","password":"{DEMO_PASSWORD}"}}"#);
    let response = app
        .oneshot(json_request("POST", "/auth/login", None, &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "MANAGEMENT");

    let token = json["data"]["token"].as_str().unwrap();
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(Config::get().jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .unwrap();
    assert_eq!(decoded.claims.role, "MANAGEMENT");
    assert_eq!(decoded.claims.sub, "123");
}

#[tokio::test]
async fn logout_acknowledges_with_valid_token() {
    let app = setup_app();
    let token = token_for("OPERATIONS");
    let response = app
        .oneshot(json_request("POST", "/auth/logout", Some(&token), "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Logged out successfully");
}

#[tokio::test]
async fn logout_requires_a_token() {
    let app = setup_app();
    let response = app
        .oneshot(json_request("POST", "/auth/logout", None, "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
