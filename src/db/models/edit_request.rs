use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// ✅ **Unanimous-approval request to reopen a submitted timesheet**
///
/// Terminal once `approved_by` covers `required_approvals` (Approved) or any
/// required supervisor rejects (Rejected, first-rejects-wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEditRequest {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub employee_id: i32,
    pub week_start: NaiveDate,
    pub required_approvals: Vec<i32>,
    pub approved_by: Vec<i32>,
    pub status: EditRequestStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TimesheetEditRequest {
    pub fn new(
        timesheet_id: Uuid,
        employee_id: i32,
        week_start: NaiveDate,
        required_approvals: Vec<i32>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            timesheet_id,
            employee_id,
            week_start,
            required_approvals,
            approved_by: Vec::new(),
            status: EditRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn requires(&self, supervisor_id: i32) -> bool {
        self.required_approvals.contains(&supervisor_id)
    }

    /// Record an approval; returns false when the supervisor already approved.
    pub fn record_approval(&mut self, supervisor_id: i32) -> bool {
        if self.approved_by.contains(&supervisor_id) {
            return false;
        }
        self.approved_by.push(supervisor_id);
        self.updated_at = Utc::now().naive_utc();
        true
    }

    pub fn is_fully_approved(&self) -> bool {
        self.required_approvals
            .iter()
            .all(|id| self.approved_by.contains(id))
    }
}
