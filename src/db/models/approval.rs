use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

/// Decision states for an approval. The set is closed; unrecognized values
/// are rejected when the request body is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Escalated,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
            ApprovalStatus::Escalated => "ESCALATED",
        };
        f.write_str(s)
    }
}

/// A decision record attached to a workflow. `workflow_id` is deliberately
/// not a foreign key: approvals may reference a deleted workflow and become
/// dangling, matching the upstream contract.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: i64,
    pub workflow_id: i64,
    pub status: ApprovalStatus,
    pub assigned_to: Option<String>,
    pub approved_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewApproval {
    pub workflow_id: i64,
    pub status: Option<ApprovalStatus>,
    pub assigned_to: Option<String>,
    pub approved_by: Option<String>,
}

/// PATCH body for deciding an approval. `status` is checked in the handler
/// so a missing value maps to a validation failure rather than a
/// deserialization error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalDecision {
    pub status: Option<ApprovalStatus>,
    pub reason: Option<String>,
}
