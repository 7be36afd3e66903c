use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Cancelled => "CANCELLED",
        }
    }

    /// APPROVED and CANCELLED are terminal; only PENDING may transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1000,
        "start_date": "2026-01-10",
        "end_date": "2026-01-12",
        "description": "Family vacation trip",
        "status": "PENDING",
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "Family vacation trip")]
    pub description: String,

    pub status: LeaveStatus,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

/// Leave request joined with the owning employee's public fields.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequestWithEmployee {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub description: String,
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "john.doe@company.com")]
    pub employee_email: String,
    pub employee_role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_non_terminal() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::from_str::<LeaveStatus>("\"CANCELLED\"").unwrap(),
            LeaveStatus::Cancelled
        );
    }
}
