pub mod authorization;
pub mod edit_request;
pub mod locks;
pub mod status;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::db::models::timesheet::{Category, Timesheet, TimesheetStatus, DAYS_PER_WEEK};
use crate::db::store::TimesheetStore;
use crate::errors::{EngineResult, TimesheetError};
use crate::utils::notification::NotificationSink;

use self::authorization::{create_scope_cache, ScopeCache};
use self::locks::TimesheetLocks;

/// ✅ **Workflow engine façade**
///
/// Owns the store and notification seams plus the per-timesheet lock registry
/// and the supervision-scope cache. All submission, review, and edit-request
/// operations go through here.
pub struct TimesheetEngine {
    store: Arc<dyn TimesheetStore>,
    sink: Arc<dyn NotificationSink>,
    scope_cache: ScopeCache,
    locks: TimesheetLocks,
}

impl TimesheetEngine {
    pub fn new(store: Arc<dyn TimesheetStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            scope_cache: create_scope_cache(),
            locks: TimesheetLocks::new(),
        }
    }

    pub fn store(&self) -> &dyn TimesheetStore {
        self.store.as_ref()
    }

    /// Create a Draft timesheet for the employee's week. The week anchor is
    /// normalized to Monday; a second sheet for the same (employee, week) is
    /// rejected while the uniqueness switch is on.
    pub async fn create_timesheet(
        &self,
        employee_id: i32,
        week_start: NaiveDate,
        data: Vec<Category>,
    ) -> EngineResult<Timesheet> {
        validate_sheet_data(&data)?;
        self.store
            .find_user(employee_id)
            .await?
            .ok_or_else(|| TimesheetError::not_found(format!("user {}", employee_id)))?;

        let sheet = Timesheet::new(employee_id, week_start, data);
        if Config::get().enforce_unique_week {
            if let Some(existing) = self
                .store
                .find_timesheet_for_week(employee_id, sheet.week_start)
                .await?
            {
                return Err(TimesheetError::conflict(format!(
                    "timesheet {} already covers week {}",
                    existing.id, sheet.week_start
                )));
            }
        }

        self.store.save_timesheet(&sheet).await?;
        tracing::info!(
            user_id = employee_id,
            week_start = %sheet.week_start,
            timesheet_id = %sheet.id,
            "Created timesheet"
        );
        Ok(sheet)
    }

    /// Replace the content of a Draft timesheet. Supervisor review state is
    /// untouched by construction: every day slot re-enters Draft.
    pub async fn update_timesheet_data(
        &self,
        employee_id: i32,
        timesheet_id: Uuid,
        data: Vec<Category>,
    ) -> EngineResult<Timesheet> {
        validate_sheet_data(&data)?;
        let _guard = self.locks.acquire(timesheet_id).await;

        let mut sheet = self.find_owned(employee_id, timesheet_id).await?;
        if sheet.status != TimesheetStatus::Draft {
            return Err(TimesheetError::conflict(format!(
                "timesheet {} is {}, content edits require draft",
                timesheet_id, sheet.status
            )));
        }

        sheet.data = data;
        for item in sheet.items_mut() {
            item.daily_status = [TimesheetStatus::Draft; DAYS_PER_WEEK];
        }
        sheet.updated_at = Utc::now().naive_utc();
        self.store.save_timesheet(&sheet).await?;
        Ok(sheet)
    }

    /// Employee-initiated delete, Draft state only.
    pub async fn delete_timesheet(&self, employee_id: i32, timesheet_id: Uuid) -> EngineResult<()> {
        let _guard = self.locks.acquire(timesheet_id).await;

        let sheet = self.find_owned(employee_id, timesheet_id).await?;
        if sheet.status != TimesheetStatus::Draft {
            return Err(TimesheetError::conflict(format!(
                "timesheet {} is {}, only drafts can be deleted",
                timesheet_id, sheet.status
            )));
        }
        self.store.delete_timesheet(timesheet_id).await?;
        tracing::info!(timesheet_id = %timesheet_id, "Deleted draft timesheet");
        Ok(())
    }

    pub(crate) async fn find_owned(
        &self,
        employee_id: i32,
        timesheet_id: Uuid,
    ) -> EngineResult<Timesheet> {
        let sheet = self
            .store
            .find_timesheet(timesheet_id)
            .await?
            .ok_or_else(|| TimesheetError::not_found(format!("timesheet {}", timesheet_id)))?;
        if sheet.user_id != employee_id {
            return Err(TimesheetError::authorization(format!(
                "timesheet {} does not belong to user {}",
                timesheet_id, employee_id
            )));
        }
        Ok(sheet)
    }

    pub(crate) async fn employee_name(&self, employee_id: i32) -> String {
        match self.store.find_user(employee_id).await {
            Ok(Some(user)) => user.username,
            _ => format!("user-{}", employee_id),
        }
    }
}

fn validate_sheet_data(data: &[Category]) -> EngineResult<()> {
    for category in data {
        for item in &category.items {
            if item.work.trim().is_empty() {
                return Err(TimesheetError::validation("item work label is required"));
            }
            for &hours in &item.hours {
                if !hours.is_finite() || hours < 0.0 {
                    return Err(TimesheetError::validation(format!(
                        "invalid hour value {} on item '{}'",
                        hours, item.work
                    )));
                }
            }
        }
    }
    Ok(())
}
