use axum::{extract::State, http::StatusCode, routing::post, Extension, Json, Router};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::audit;
use crate::config::Config;
use crate::db::models::user::{User, UserRole};
use crate::errors::ApiError;
use crate::utils::api_response::ApiResponse;

/// Demo bypass credential pair. Always authenticates with role MANAGEMENT
/// regardless of stored user data; can be switched off via
/// `DEMO_LOGIN_ENABLED=false`.
pub const DEMO_EMAIL: &str = "admin@gmail.com";
pub const DEMO_PASSWORD: &str = "admin123";
const DEMO_SUBJECT: &str = "123";

/// JWT claims used for authentication.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject - user ID as string
    pub sub: String,
    /// Email of the authenticated user
    pub email: String,
    /// Role assigned to the user
    pub role: String,
    /// Expiration timestamp (UNIX time)
    pub exp: usize,
}

impl Claims {
    /// Converts `sub` (user ID) to `i64`, or returns a descriptive error.
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| ApiError::Unauthorized("Invalid user ID format in token".into()))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub mobile_number: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

/// Sign a token for the given subject/email/role with the configured TTL.
pub fn issue_token(sub: &str, email: &str, role: &str) -> Result<String, ApiError> {
    let config = Config::get();
    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: (Utc::now().timestamp() + config.token_ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Token generation failed: {e}")))
}

pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    hash(plaintext, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {e}")))
}

/// Handles user login.
///
/// The demo credential pair short-circuits before any database access and
/// always yields role MANAGEMENT.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account is deactivated"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn login(
    State(pool): State<PgPool>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    if Config::get().demo_login_enabled
        && payload.email == DEMO_EMAIL
        && payload.password == DEMO_PASSWORD
    {
        let token = issue_token(DEMO_SUBJECT, DEMO_EMAIL, "MANAGEMENT")?;
        tracing::info!("demo login used");
        return Ok(ApiResponse::success(
            StatusCode::OK,
            "Login successful",
            LoginResponse {
                token,
                role: "MANAGEMENT".to_string(),
                email: None,
                first_name: None,
                last_name: None,
            },
        ));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::warn!("invalid password attempt for {}", payload.email);
        return Err(ApiError::InvalidCredentials);
    }

    // Only report deactivation to callers who hold the right password;
    // anyone else sees the same 401 as any bad credential.
    if !user.active {
        tracing::warn!("login attempt for deactivated account: {}", payload.email);
        return Err(ApiError::Forbidden(
            "Account is deactivated. Contact your administrator.".into(),
        ));
    }

    let role = user.role.to_string();
    let token = issue_token(&user.id.to_string(), &user.email, &role)?;
    tracing::info!("login successful for {}", payload.email);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Login successful",
        LoginResponse {
            token,
            role,
            email: Some(user.email),
            first_name: Some(user.first_name),
            last_name: Some(user.last_name),
        },
    ))
}

/// Handles user registration. New accounts default to role USER and an
/// active flag of true; the submitted password is stored bcrypt-hashed.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 409, description = "Email or username already taken"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<RegisterResponse>, ApiError> {
    let email_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(&payload.email)
            .fetch_one(&pool)
            .await?;
    if email_taken {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let username_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(&payload.username)
            .fetch_one(&pool)
            .await?;
    if username_taken {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users
            (first_name, last_name, username, email, password_hash,
             mobile_number, gender, department, role, active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, NOW(), NOW())
         RETURNING *",
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.mobile_number)
    .bind(&payload.gender)
    .bind(&payload.department)
    .bind(UserRole::User)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        // Unique-index race fallback
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.code().as_deref() == Some("23505") {
                return ApiError::Conflict("Email or username already taken".into());
            }
        }
        ApiError::from(e)
    })?;

    let role = user.role.to_string();
    let token = issue_token(&user.id.to_string(), &user.email, &role)?;

    // Registration has no authenticated caller; the recorder drops the row.
    audit::record(
        &pool,
        None,
        "REGISTER_USER",
        "User",
        &user.id.to_string(),
        None,
        audit::snapshot(&user),
    )
    .await;

    tracing::info!("registered user {}", user.username);
    Ok(ApiResponse::created(
        "User registered",
        RegisterResponse { user, token },
    ))
}

/// Stateless logout. The token stays valid until it expires; this endpoint
/// only acknowledges the client-side discard.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Logged out")),
    security(("bearerAuth" = []))
)]
pub async fn logout(Extension(claims): Extension<Claims>) -> ApiResponse<()> {
    tracing::info!("logout acknowledged for {}", claims.email);
    ApiResponse::success(StatusCode::OK, "Logged out successfully", ())
}

/// Public authentication routes (no token required).
pub fn auth_routes() -> Router<PgPool> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Authenticated auth routes, mounted behind the JWT middleware.
pub fn secure_auth_routes() -> Router<PgPool> {
    Router::new().route("/auth/logout", post(logout))
}

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::Modify;
use utoipa::OpenApi;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.clone().unwrap_or(Components::default());
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        openapi.components = Some(components);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(login, register, logout),
    components(schemas(LoginRequest, LoginResponse, RegisterRequest, RegisterResponse)),
    tags((name = "Authentication", description = "User auth endpoints")),
    modifiers(&SecurityAddon)
)]
pub struct AuthDoc;
