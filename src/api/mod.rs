pub mod approval;
pub mod audit;
pub mod auth;
pub mod health;
pub mod user;
pub mod workflow;

use axum::middleware::from_fn;
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::auth::jwt_middleware;

/// Assemble the full application router. Public routes (auth, health) sit
/// outside the JWT middleware; everything else requires a valid token.
pub fn app(pool: PgPool) -> Router {
    let merged_doc = auth::AuthDoc::openapi()
        .merge_from(crate::db::queries::user::UserDoc::openapi())
        .merge_from(crate::db::queries::workflow::WorkflowDoc::openapi())
        .merge_from(crate::db::queries::approval::ApprovalDoc::openapi())
        .merge_from(crate::db::queries::audit::AuditDoc::openapi());

    let public_routes = Router::new()
        .merge(health::health_routes())
        .merge(auth::auth_routes());

    let private_routes = Router::new()
        .merge(auth::secure_auth_routes())
        .merge(user::user_routes())
        .merge(workflow::workflow_routes())
        .merge(approval::approval_routes())
        .merge(audit::audit_routes())
        .route_layer(from_fn(jwt_middleware));

    Router::new()
        .merge(public_routes)
        .merge(private_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
