use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ✅ **Append-only audit record correlating rejected day slots with a reason**
///
/// Never updated or deleted once written; read back by the report aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectReason {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i32>,
    pub work_name: String,
    pub reason: String,
    pub rejected_day_indices: Vec<usize>,
    pub created_at: NaiveDateTime,
}

impl RejectReason {
    pub fn new(
        timesheet_id: Uuid,
        project_id: Option<i32>,
        team_id: Option<i32>,
        work_name: impl Into<String>,
        reason: impl Into<String>,
        rejected_day_indices: Vec<usize>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timesheet_id,
            project_id,
            team_id,
            work_name: work_name.into(),
            reason: reason.into(),
            rejected_day_indices,
            created_at: Utc::now().naive_utc(),
        }
    }
}
