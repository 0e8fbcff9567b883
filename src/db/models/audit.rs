use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Append-only record of who changed what. Rows are written once and never
/// updated.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i64,
    pub user_name: String,
    pub role: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub previous_state: Option<String>,
    pub new_state: String,
    pub timestamp: Option<NaiveDateTime>,
}

/// Manual append via POST /auditLogs.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditLog {
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub previous_state: Option<String>,
    pub new_state: String,
}

/// Query string for the paginated audit listing.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
    #[serde(default)]
    pub search: String,
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub items: Vec<AuditLog>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_match_upstream_paging() {
        let q: AuditQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 0);
        assert_eq!(q.size, 10);
        assert_eq!(q.search, "");
    }
}
