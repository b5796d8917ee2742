use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::db::models::edit_request::TimesheetEditRequest;
use crate::db::models::project::Project;
use crate::db::models::reject_reason::RejectReason;
use crate::db::models::team::Team;
use crate::db::models::timesheet::Timesheet;
use crate::db::models::user::User;

/// Errors that can occur in the storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// ✅ **Persistence seam for the workflow engine**
///
/// The engine only assumes per-document atomic replace; it serializes its own
/// read-modify-write cycles through a keyed mutex. Implementations decide the
/// actual storage technology.
#[async_trait]
pub trait TimesheetStore: Send + Sync {
    async fn find_timesheet(&self, id: Uuid) -> Result<Option<Timesheet>, StoreError>;

    async fn find_timesheet_for_week(
        &self,
        user_id: i32,
        week_start: NaiveDate,
    ) -> Result<Option<Timesheet>, StoreError>;

    /// Atomic whole-document replace (insert when absent).
    async fn save_timesheet(&self, timesheet: &Timesheet) -> Result<(), StoreError>;

    async fn delete_timesheet(&self, id: Uuid) -> Result<(), StoreError>;

    /// All timesheets whose week start falls in `[from, to]` inclusive.
    async fn find_timesheets_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Timesheet>, StoreError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError>;

    async fn find_project(&self, id: i32) -> Result<Option<Project>, StoreError>;

    async fn find_projects_by_supervisor(&self, supervisor_id: i32)
        -> Result<Vec<Project>, StoreError>;

    async fn find_teams_by_supervisor(&self, supervisor_id: i32) -> Result<Vec<Team>, StoreError>;

    async fn find_projects_by_member(&self, user_id: i32) -> Result<Vec<Project>, StoreError>;

    async fn find_teams_by_member(&self, user_id: i32) -> Result<Vec<Team>, StoreError>;

    /// Append-only; the ledger is never updated in place.
    async fn create_reject_reason(&self, record: &RejectReason) -> Result<(), StoreError>;

    async fn find_reject_reasons_by_timesheet_ids(
        &self,
        timesheet_ids: &[Uuid],
    ) -> Result<Vec<RejectReason>, StoreError>;

    async fn create_edit_request(&self, request: &TimesheetEditRequest) -> Result<(), StoreError>;

    async fn save_edit_request(&self, request: &TimesheetEditRequest) -> Result<(), StoreError>;

    /// The open (Pending) request for a timesheet, if one exists.
    async fn find_pending_edit_request(
        &self,
        timesheet_id: Uuid,
    ) -> Result<Option<TimesheetEditRequest>, StoreError>;
}
