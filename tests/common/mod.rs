// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;

use approval_backend::api;
use approval_backend::config::Config;

/// Build the full application router against a lazy pool. Tests in this
/// suite only exercise paths that never reach the database (health, demo
/// login, token and role guards, pre-query validation), so no Postgres
/// instance is required.
pub fn setup_app() -> Router {
    let pool = PgPool::connect_lazy("postgres://localhost/approvals_test")
        .expect("lazy pool construction cannot fail");
    app_with_pool(pool)
}

/// Build the router around a live pool, e.g. one provisioned by
/// `#[sqlx::test]`.
pub fn app_with_pool(pool: PgPool) -> Router {
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
    }
    Config::init_once();
    api::app(pool)
}

pub fn token_for(role: &str) -> String {
    api::auth::issue_token("7", "tester@example.com", role).expect("token issuance")
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, path: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
