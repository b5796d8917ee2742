use chrono::Utc;
use uuid::Uuid;

use crate::db::models::edit_request::{EditRequestStatus, TimesheetEditRequest};
use crate::db::models::timesheet::{TimesheetStatus, DAYS_PER_WEEK};
use crate::engine::authorization::supervisors_of;
use crate::errors::{EngineResult, TimesheetError};
use crate::utils::notification::{dispatch, TimesheetEvent};

use super::TimesheetEngine;

impl TimesheetEngine {
    /// Open an edit request on a submitted (Pending or Approved) timesheet.
    ///
    /// Idempotent: an already-open request is returned as-is instead of being
    /// duplicated. Required approvals are the employee's full supervisor set.
    pub async fn request_edit(
        &self,
        employee_id: i32,
        timesheet_id: Uuid,
    ) -> EngineResult<TimesheetEditRequest> {
        let _guard = self.locks.acquire(timesheet_id).await;

        let mut sheet = self.find_owned(employee_id, timesheet_id).await?;
        if let Some(existing) = self.store.find_pending_edit_request(timesheet_id).await? {
            return Ok(existing);
        }
        if !matches!(
            sheet.status,
            TimesheetStatus::Pending | TimesheetStatus::Approved
        ) {
            return Err(TimesheetError::conflict(format!(
                "timesheet {} is {}, edit requests require pending or approved",
                timesheet_id, sheet.status
            )));
        }

        let required = supervisors_of(self.store.as_ref(), employee_id).await?;
        if required.is_empty() {
            return Err(TimesheetError::validation(format!(
                "user {} has no supervisors to approve an edit request",
                employee_id
            )));
        }

        let request =
            TimesheetEditRequest::new(timesheet_id, employee_id, sheet.week_start, required);
        self.store.create_edit_request(&request).await?;

        sheet.status = TimesheetStatus::EditRequested;
        sheet.updated_at = Utc::now().naive_utc();
        self.store.save_timesheet(&sheet).await?;
        tracing::info!(
            timesheet_id = %timesheet_id,
            user_id = employee_id,
            approvers = request.required_approvals.len(),
            "Edit request opened"
        );

        let employee_name = self.employee_name(employee_id).await;
        let (week_start, week_end) = sheet.week_bounds();
        for &supervisor_id in &request.required_approvals {
            dispatch(
                self.sink.as_ref(),
                TimesheetEvent::TimesheetEditRequest {
                    supervisor_id,
                    employee_name: employee_name.clone(),
                    week_start,
                    week_end,
                    timesheet_id,
                },
            )
            .await;
        }

        Ok(request)
    }

    /// Record one supervisor's approval. Re-approval by the same supervisor
    /// is a no-op. Once the last required approval lands the request turns
    /// Approved and the timesheet resets to an editable Draft: weekly status
    /// and every day slot back to Draft, hours and descriptions untouched.
    pub async fn approve_edit(
        &self,
        supervisor_id: i32,
        timesheet_id: Uuid,
    ) -> EngineResult<TimesheetEditRequest> {
        let _guard = self.locks.acquire(timesheet_id).await;

        let mut request = self.pending_request(timesheet_id).await?;
        if !request.requires(supervisor_id) {
            return Err(TimesheetError::authorization(format!(
                "supervisor {} is not a required approver for timesheet {}",
                supervisor_id, timesheet_id
            )));
        }

        if !request.record_approval(supervisor_id) {
            return Ok(request);
        }

        if request.is_fully_approved() {
            request.status = EditRequestStatus::Approved;
            self.store.save_edit_request(&request).await?;

            let mut sheet = self
                .store
                .find_timesheet(timesheet_id)
                .await?
                .ok_or_else(|| TimesheetError::not_found(format!("timesheet {}", timesheet_id)))?;
            sheet.status = TimesheetStatus::Draft;
            sheet.rejection_reason = None;
            sheet.approved_at = None;
            for item in sheet.items_mut() {
                item.daily_status = [TimesheetStatus::Draft; DAYS_PER_WEEK];
            }
            sheet.updated_at = Utc::now().naive_utc();
            self.store.save_timesheet(&sheet).await?;
            tracing::info!(
                timesheet_id = %timesheet_id,
                "Edit request fully approved, timesheet reset to draft"
            );

            let (week_start, week_end) = sheet.week_bounds();
            dispatch(
                self.sink.as_ref(),
                TimesheetEvent::TimesheetEditApproved {
                    employee_id: sheet.user_id,
                    week_start,
                    week_end,
                },
            )
            .await;
        } else {
            self.store.save_edit_request(&request).await?;
        }

        Ok(request)
    }

    /// Any required supervisor may unilaterally reject (first-rejects-wins).
    /// The timesheet reverts to Pending with content unchanged.
    pub async fn reject_edit(
        &self,
        supervisor_id: i32,
        timesheet_id: Uuid,
    ) -> EngineResult<TimesheetEditRequest> {
        let _guard = self.locks.acquire(timesheet_id).await;

        let mut request = self.pending_request(timesheet_id).await?;
        if !request.requires(supervisor_id) {
            return Err(TimesheetError::authorization(format!(
                "supervisor {} is not a required approver for timesheet {}",
                supervisor_id, timesheet_id
            )));
        }

        request.status = EditRequestStatus::Rejected;
        request.updated_at = Utc::now().naive_utc();
        self.store.save_edit_request(&request).await?;

        let mut sheet = self
            .store
            .find_timesheet(timesheet_id)
            .await?
            .ok_or_else(|| TimesheetError::not_found(format!("timesheet {}", timesheet_id)))?;
        sheet.status = TimesheetStatus::Pending;
        sheet.updated_at = Utc::now().naive_utc();
        self.store.save_timesheet(&sheet).await?;
        tracing::info!(timesheet_id = %timesheet_id, supervisor_id, "Edit request rejected");

        let (week_start, week_end) = sheet.week_bounds();
        dispatch(
            self.sink.as_ref(),
            TimesheetEvent::TimesheetEditRejected {
                employee_id: sheet.user_id,
                week_start,
                week_end,
            },
        )
        .await;

        Ok(request)
    }

    async fn pending_request(&self, timesheet_id: Uuid) -> EngineResult<TimesheetEditRequest> {
        self.store
            .find_pending_edit_request(timesheet_id)
            .await?
            .ok_or_else(|| {
                TimesheetError::not_found(format!(
                    "pending edit request for timesheet {}",
                    timesheet_id
                ))
            })
    }
}
