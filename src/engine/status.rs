use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::reject_reason::RejectReason;
use crate::db::models::timesheet::{Timesheet, TimesheetStatus, DAYS_PER_WEEK};
use crate::engine::authorization::{resolve_scope, supervisors_of};
use crate::errors::{EngineResult, TimesheetError};
use crate::utils::notification::{dispatch, TimesheetEvent};

use super::TimesheetEngine;

/// One supervisor decision: a set of day slots on one item of one timesheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatusUpdate {
    pub timesheet_id: Uuid,
    pub category_index: usize,
    pub item_index: usize,
    pub day_indices: Vec<usize>,
    pub status: TimesheetStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TimesheetEngine {
    /// Submit a timesheet for review.
    ///
    /// From Draft every day slot with hours flips to Pending. From Rejected
    /// only the rejected slots flip back, so previously approved days keep
    /// their approval across a resubmission.
    pub async fn submit(&self, employee_id: i32, timesheet_id: Uuid) -> EngineResult<Timesheet> {
        let _guard = self.locks.acquire(timesheet_id).await;

        let mut sheet = self.find_owned(employee_id, timesheet_id).await?;
        let resubmission = match sheet.status {
            TimesheetStatus::Draft => false,
            TimesheetStatus::Rejected => true,
            other => {
                return Err(TimesheetError::conflict(format!(
                    "timesheet {} is {}, submit requires draft or rejected",
                    timesheet_id, other
                )))
            }
        };

        for item in sheet.items_mut() {
            for day in 0..DAYS_PER_WEEK {
                if item.hours[day] <= 0.0 {
                    continue;
                }
                let flips = if resubmission {
                    item.daily_status[day] == TimesheetStatus::Rejected
                } else {
                    item.daily_status[day] == TimesheetStatus::Draft
                };
                if flips {
                    item.daily_status[day] = TimesheetStatus::Pending;
                }
            }
        }

        let now = Utc::now().naive_utc();
        sheet.status = TimesheetStatus::Pending;
        sheet.submitted_at = Some(now);
        sheet.rejection_reason = None;
        sheet.updated_at = now;
        self.store.save_timesheet(&sheet).await?;
        tracing::info!(
            timesheet_id = %timesheet_id,
            user_id = employee_id,
            resubmission,
            "Timesheet submitted"
        );

        self.notify_submission(&sheet).await;
        Ok(sheet)
    }

    /// Approve or reject day slots on a single item. Runs through the batch
    /// path so single and batch updates cannot drift apart.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_daily_status(
        &self,
        supervisor_id: i32,
        timesheet_id: Uuid,
        category_index: usize,
        item_index: usize,
        day_indices: Vec<usize>,
        status: TimesheetStatus,
        reason: Option<String>,
    ) -> EngineResult<Timesheet> {
        self.batch_update_daily_status(
            supervisor_id,
            vec![DailyStatusUpdate {
                timesheet_id,
                category_index,
                item_index,
                day_indices,
                status,
                reason,
            }],
        )
        .await?;

        self.store
            .find_timesheet(timesheet_id)
            .await?
            .ok_or_else(|| TimesheetError::not_found(format!("timesheet {}", timesheet_id)))
    }

    /// Apply a batch of supervisor decisions.
    ///
    /// Updates are grouped by timesheet and each group is one
    /// fetch-validate-mutate-save cycle under that sheet's lock; authorization,
    /// state, and index validation cover the whole group before any slot is
    /// touched.
    /// All-or-nothing holds per timesheet, not across the batch: a failure
    /// aborts the failing sheet and raises, while sheets committed earlier in
    /// the same call stay committed.
    pub async fn batch_update_daily_status(
        &self,
        supervisor_id: i32,
        updates: Vec<DailyStatusUpdate>,
    ) -> EngineResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let supervisor = self
            .store
            .find_user(supervisor_id)
            .await?
            .ok_or_else(|| TimesheetError::not_found(format!("user {}", supervisor_id)))?;
        if !supervisor.role.can_review() {
            return Err(TimesheetError::authorization(format!(
                "user {} ({}) cannot review timesheets",
                supervisor_id, supervisor.role
            )));
        }

        for update in &updates {
            if !matches!(
                update.status,
                TimesheetStatus::Approved | TimesheetStatus::Rejected
            ) {
                return Err(TimesheetError::validation(format!(
                    "daily status must be approved or rejected, got {}",
                    update.status
                )));
            }
        }

        let scope = resolve_scope(self.store.as_ref(), &self.scope_cache, supervisor_id).await?;

        // Group by timesheet, preserving first-seen order.
        let mut groups: Vec<(Uuid, Vec<DailyStatusUpdate>)> = Vec::new();
        for update in updates {
            match groups.iter_mut().find(|(id, _)| *id == update.timesheet_id) {
                Some((_, group)) => group.push(update),
                None => groups.push((update.timesheet_id, vec![update])),
            }
        }

        for (timesheet_id, group) in groups {
            let _guard = self.locks.acquire(timesheet_id).await;

            let mut sheet = self
                .store
                .find_timesheet(timesheet_id)
                .await?
                .ok_or_else(|| TimesheetError::not_found(format!("timesheet {}", timesheet_id)))?;
            if sheet.status == TimesheetStatus::EditRequested {
                return Err(TimesheetError::conflict(format!(
                    "timesheet {} is locked by an open edit request",
                    timesheet_id
                )));
            }

            // Validate the entire group before touching the sheet.
            for update in &group {
                let category = sheet.data.get(update.category_index).ok_or_else(|| {
                    TimesheetError::validation(format!(
                        "category index {} out of range",
                        update.category_index
                    ))
                })?;
                let item = category.items.get(update.item_index).ok_or_else(|| {
                    TimesheetError::validation(format!(
                        "item index {} out of range",
                        update.item_index
                    ))
                })?;
                for &day in &update.day_indices {
                    if day >= DAYS_PER_WEEK {
                        return Err(TimesheetError::validation(format!(
                            "day index {} out of range",
                            day
                        )));
                    }
                    if !item.has_hours(day) {
                        return Err(TimesheetError::validation(format!(
                            "day {} of item '{}' has no hours recorded",
                            day, item.work
                        )));
                    }
                    // Draft slots have never been submitted; only submission
                    // moves them to Pending and into review.
                    if item.daily_status[day] == TimesheetStatus::Draft {
                        return Err(TimesheetError::conflict(format!(
                            "day {} of item '{}' has not been submitted for review",
                            day, item.work
                        )));
                    }
                }
                if !scope.permits_item(sheet.user_id, item) {
                    return Err(TimesheetError::authorization(format!(
                        "supervisor {} is not in scope for item '{}'",
                        supervisor_id, item.work
                    )));
                }
            }

            let week_start = sheet.week_start;
            let mut rejected_dates = Vec::new();
            let mut last_reason: Option<String> = None;
            let mut reject_records = Vec::new();
            let mut rejected_project = None;

            for update in &group {
                let item = &mut sheet.data[update.category_index].items[update.item_index];
                for &day in &update.day_indices {
                    item.daily_status[day] = update.status;
                }
                if update.status == TimesheetStatus::Rejected {
                    rejected_dates.extend(
                        update
                            .day_indices
                            .iter()
                            .map(|&d| week_start + Duration::days(d as i64)),
                    );
                    if rejected_project.is_none() {
                        rejected_project = item.project_id;
                    }
                    if let Some(reason) = &update.reason {
                        last_reason = Some(reason.clone());
                        reject_records.push(RejectReason::new(
                            timesheet_id,
                            item.project_id,
                            item.team_id,
                            item.work.clone(),
                            reason.clone(),
                            update.day_indices.clone(),
                        ));
                    }
                }
            }

            sheet.recompute_weekly_status(last_reason.as_deref());
            sheet.updated_at = Utc::now().naive_utc();
            self.store.save_timesheet(&sheet).await?;
            tracing::info!(
                timesheet_id = %timesheet_id,
                supervisor_id,
                weekly_status = %sheet.status,
                "Applied daily status updates"
            );

            // Side effects after the primary save: audit records and the
            // consolidated rejection notice are best-effort.
            for record in &reject_records {
                if let Err(e) = self.store.create_reject_reason(record).await {
                    tracing::warn!(timesheet_id = %timesheet_id, "Failed to append reject reason: {}", e);
                }
            }
            if !rejected_dates.is_empty() {
                rejected_dates.sort_unstable();
                rejected_dates.dedup();
                let project_name = match rejected_project {
                    Some(id) => self
                        .store
                        .find_project(id)
                        .await
                        .ok()
                        .flatten()
                        .map(|p| p.name),
                    None => None,
                };
                dispatch(
                    self.sink.as_ref(),
                    TimesheetEvent::TimesheetRejected {
                        user_id: sheet.user_id,
                        project_name,
                        rejected_dates,
                        reason: last_reason,
                    },
                )
                .await;
            }
        }

        Ok(())
    }

    /// Tell every supervisor in scope that a sheet landed in their queue.
    async fn notify_submission(&self, sheet: &Timesheet) {
        let supervisors = match supervisors_of(self.store.as_ref(), sheet.user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    timesheet_id = %sheet.id,
                    "Could not resolve supervisors for submission notice: {}",
                    e
                );
                return;
            }
        };
        let employee_name = self.employee_name(sheet.user_id).await;
        let (week_start, week_end) = sheet.week_bounds();
        for supervisor_id in supervisors {
            dispatch(
                self.sink.as_ref(),
                TimesheetEvent::TimesheetSubmitted {
                    supervisor_id,
                    employee_name: employee_name.clone(),
                    week_start,
                    week_end,
                },
            )
            .await;
        }
    }
}
