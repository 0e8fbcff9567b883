use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::api::auth::Claims;
use crate::config::Config;
use crate::db::models::user::UserRole;
use crate::errors::ApiError;

/// JWT middleware. Extracts the bearer token, validates it and stores the
/// decoded claims in request extensions for handlers and role guards.
pub async fn jwt_middleware(mut req: Request<Body>, next: Next) -> Result<Response, Response> {
    let auth_header = req.headers().get("Authorization").ok_or_else(|| {
        ApiError::Unauthorized("Missing Authorization header".into()).into_response()
    })?;

    let token_str = auth_header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header format".into()).into_response()
    })?;

    let token = token_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Invalid token format (missing 'Bearer ' prefix)".into())
            .into_response()
    })?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(Config::get().jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT validation failed: {e}");
        ApiError::Unauthorized("Invalid or expired token".into()).into_response()
    })?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// Role guard used by handlers before any side effect. Returns the parsed
/// role on success so callers can branch on it.
pub fn require_role(claims: &Claims, allowed: &[UserRole]) -> Result<UserRole, ApiError> {
    let role: UserRole = claims
        .role
        .parse()
        .map_err(|_| ApiError::Forbidden(format!("Unknown role: {}", claims.role)))?;
    if allowed.contains(&role) {
        Ok(role)
    } else {
        Err(ApiError::Forbidden(
            "Insufficient role for this operation".into(),
        ))
    }
}

/// Self-or-privileged guard: the caller may act on their own record, or must
/// hold one of the allowed roles.
pub fn require_self_or(claims: &Claims, user_id: i64, allowed: &[UserRole]) -> Result<(), ApiError> {
    if claims.user_id()? == user_id {
        return Ok(());
    }
    require_role(claims, allowed).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "user@example.com".to_string(),
            role: role.to_string(),
            exp: 4102444800, // far future
        }
    }

    #[test]
    fn admin_passes_admin_gate() {
        assert!(require_role(&claims("1", "ADMIN"), &[UserRole::Admin]).is_ok());
    }

    #[test]
    fn operations_cannot_pass_admin_gate() {
        let err = require_role(&claims("1", "OPERATIONS"), &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.kind(), "FORBIDDEN");
    }

    #[test]
    fn unknown_role_string_is_forbidden() {
        let err = require_role(&claims("1", "ROOT"), &[UserRole::Admin]).unwrap_err();
        assert_eq!(err.kind(), "FORBIDDEN");
    }

    #[test]
    fn self_access_bypasses_role_check() {
        assert!(require_self_or(&claims("42", "USER"), 42, &[UserRole::Admin]).is_ok());
        assert!(require_self_or(&claims("42", "USER"), 43, &[UserRole::Admin]).is_err());
    }
}
