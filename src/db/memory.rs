use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::edit_request::{EditRequestStatus, TimesheetEditRequest};
use crate::db::models::project::Project;
use crate::db::models::reject_reason::RejectReason;
use crate::db::models::team::Team;
use crate::db::models::timesheet::Timesheet;
use crate::db::models::user::User;
use crate::db::store::{StoreError, TimesheetStore};

/// ✅ **Reference store adapter over in-process hash maps**
///
/// Every read hands out an owned clone, so callers can never alias the stored
/// `daily_status` arrays; writes are whole-document replaces.
#[derive(Default)]
pub struct InMemoryStore {
    timesheets: RwLock<HashMap<Uuid, Timesheet>>,
    users: RwLock<HashMap<i32, User>>,
    projects: RwLock<HashMap<i32, Project>>,
    teams: RwLock<HashMap<i32, Team>>,
    reject_reasons: RwLock<Vec<RejectReason>>,
    edit_requests: RwLock<HashMap<Uuid, TimesheetEditRequest>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_project(&self, project: Project) {
        self.projects.write().await.insert(project.id, project);
    }

    pub async fn insert_team(&self, team: Team) {
        self.teams.write().await.insert(team.id, team);
    }

    pub async fn reject_reason_count(&self) -> usize {
        self.reject_reasons.read().await.len()
    }
}

#[async_trait]
impl TimesheetStore for InMemoryStore {
    async fn find_timesheet(&self, id: Uuid) -> Result<Option<Timesheet>, StoreError> {
        Ok(self.timesheets.read().await.get(&id).cloned())
    }

    async fn find_timesheet_for_week(
        &self,
        user_id: i32,
        week_start: NaiveDate,
    ) -> Result<Option<Timesheet>, StoreError> {
        Ok(self
            .timesheets
            .read()
            .await
            .values()
            .find(|ts| ts.user_id == user_id && ts.week_start == week_start)
            .cloned())
    }

    async fn save_timesheet(&self, timesheet: &Timesheet) -> Result<(), StoreError> {
        self.timesheets
            .write()
            .await
            .insert(timesheet.id, timesheet.clone());
        Ok(())
    }

    async fn delete_timesheet(&self, id: Uuid) -> Result<(), StoreError> {
        self.timesheets.write().await.remove(&id);
        Ok(())
    }

    async fn find_timesheets_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Timesheet>, StoreError> {
        let mut sheets: Vec<Timesheet> = self
            .timesheets
            .read()
            .await
            .values()
            .filter(|ts| ts.week_start >= from && ts.week_start <= to)
            .cloned()
            .collect();
        sheets.sort_by_key(|ts| (ts.user_id, ts.week_start, ts.created_at));
        Ok(sheets)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_project(&self, id: i32) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn find_projects_by_supervisor(
        &self,
        supervisor_id: i32,
    ) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .filter(|p| p.supervisor == Some(supervisor_id))
            .cloned()
            .collect())
    }

    async fn find_teams_by_supervisor(&self, supervisor_id: i32) -> Result<Vec<Team>, StoreError> {
        Ok(self
            .teams
            .read()
            .await
            .values()
            .filter(|t| t.supervisor == Some(supervisor_id))
            .cloned()
            .collect())
    }

    async fn find_projects_by_member(&self, user_id: i32) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .filter(|p| p.employees.contains(&user_id))
            .cloned()
            .collect())
    }

    async fn find_teams_by_member(&self, user_id: i32) -> Result<Vec<Team>, StoreError> {
        Ok(self
            .teams
            .read()
            .await
            .values()
            .filter(|t| t.members.contains(&user_id))
            .cloned()
            .collect())
    }

    async fn create_reject_reason(&self, record: &RejectReason) -> Result<(), StoreError> {
        self.reject_reasons.write().await.push(record.clone());
        Ok(())
    }

    async fn find_reject_reasons_by_timesheet_ids(
        &self,
        timesheet_ids: &[Uuid],
    ) -> Result<Vec<RejectReason>, StoreError> {
        Ok(self
            .reject_reasons
            .read()
            .await
            .iter()
            .filter(|r| timesheet_ids.contains(&r.timesheet_id))
            .cloned()
            .collect())
    }

    async fn create_edit_request(&self, request: &TimesheetEditRequest) -> Result<(), StoreError> {
        self.edit_requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn save_edit_request(&self, request: &TimesheetEditRequest) -> Result<(), StoreError> {
        self.edit_requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn find_pending_edit_request(
        &self,
        timesheet_id: Uuid,
    ) -> Result<Option<TimesheetEditRequest>, StoreError> {
        Ok(self
            .edit_requests
            .read()
            .await
            .values()
            .find(|r| r.timesheet_id == timesheet_id && r.status == EditRequestStatus::Pending)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::timesheet::Category;

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let store = InMemoryStore::new();
        let sheet = Timesheet::new(
            1,
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            vec![Category {
                category: "Project".to_string(),
                items: vec![],
            }],
        );
        store.save_timesheet(&sheet).await.unwrap();

        let found = store.find_timesheet(sheet.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, 1);
        assert_eq!(found.week_start, sheet.week_start);
    }

    #[tokio::test]
    async fn pending_edit_request_lookup_ignores_terminal_requests() {
        let store = InMemoryStore::new();
        let ts_id = Uuid::new_v4();
        let mut req = TimesheetEditRequest::new(
            ts_id,
            1,
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            vec![2],
        );
        req.status = EditRequestStatus::Rejected;
        store.create_edit_request(&req).await.unwrap();

        assert!(store
            .find_pending_edit_request(ts_id)
            .await
            .unwrap()
            .is_none());
    }
}
