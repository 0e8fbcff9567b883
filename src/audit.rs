//! Best-effort audit trail. Every mutation handler calls [`record`] with the
//! caller's claims passed in explicitly; there is no ambient security
//! context to consult. Failures are logged and swallowed so the primary
//! operation is never blocked by auditing.

use sqlx::PgPool;

use crate::api::auth::Claims;

/// Append one audit row. `claims` is `None` when the request had no
/// authenticated caller (e.g. registration); the row is skipped in that
/// case. Errors never propagate to the caller.
pub async fn record(
    pool: &PgPool,
    claims: Option<&Claims>,
    action: &str,
    entity: &str,
    entity_id: &str,
    previous_state: Option<String>,
    new_state: String,
) {
    let Some(claims) = claims else {
        tracing::warn!(action, entity, "audit skipped: no authenticated context");
        return;
    };

    let result = sqlx::query(
        "INSERT INTO audit_logs (user_name, role, action, entity, entity_id, previous_state, new_state, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())",
    )
    .bind(&claims.email)
    .bind(&claims.role)
    .bind(action)
    .bind(entity)
    .bind(entity_id)
    .bind(previous_state)
    .bind(new_state)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(action, entity, entity_id, "audit write failed: {e}");
    }
}

/// Serialize an entity snapshot for the previous/new state columns. Audit is
/// best effort, so serialization failures degrade to an empty string.
pub fn snapshot<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Missing auth context must not panic, error or touch the database.
    // The lazy pool would fail on first use, so completing is the proof.
    #[tokio::test]
    async fn record_without_claims_is_a_no_op() {
        let pool = PgPool::connect_lazy("postgres://localhost/unreachable").unwrap();
        record(
            &pool,
            None,
            "CREATE_WORKFLOW",
            "Workflow",
            "1",
            None,
            "{}".to_string(),
        )
        .await;
    }

    #[test]
    fn snapshot_never_fails() {
        assert_eq!(snapshot(&serde_json::json!({"a": 1})), r#"{"a":1}"#);
    }
}
