use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

/// Workflow lifecycle states. No transition ordering is enforced between
/// them; any status may follow any other via PUT/PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Created,
    Review,
    Approved,
    Rejected,
    Escalated,
    FinalApproved,
    Completed,
    Draft,
    Reopened,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::Created => "CREATED",
            WorkflowStatus::Review => "REVIEW",
            WorkflowStatus::Approved => "APPROVED",
            WorkflowStatus::Rejected => "REJECTED",
            WorkflowStatus::Escalated => "ESCALATED",
            WorkflowStatus::FinalApproved => "FINAL_APPROVED",
            WorkflowStatus::Completed => "COMPLETED",
            WorkflowStatus::Draft => "DRAFT",
            WorkflowStatus::Reopened => "REOPENED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub wf_type: String,
    pub status: WorkflowStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub wf_type: Option<String>,
    pub status: Option<WorkflowStatus>,
}

/// Full replacement used by PUT.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflow {
    pub name: String,
    #[serde(rename = "type")]
    pub wf_type: String,
    pub status: WorkflowStatus,
}

/// Partial field-map update used by PATCH.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchWorkflow {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub wf_type: Option<String>,
    pub status: Option<WorkflowStatus>,
}

impl PatchWorkflow {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.wf_type.is_none() && self.status.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: WorkflowStatus,
}
