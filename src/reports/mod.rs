use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::db::models::timesheet::{Timesheet, TimesheetStatus, WEEKDAYS};
use crate::db::store::TimesheetStore;
use crate::errors::EngineResult;

/// Submission-view classification per (employee, week).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Missing,
    Late,
    Submitted,
}

impl SubmissionStatus {
    /// Duplicate (employee, week) rows collapse to the higher precedence.
    fn precedence(self) -> u8 {
        match self {
            SubmissionStatus::Submitted => 3,
            SubmissionStatus::Late => 2,
            SubmissionStatus::Missing => 1,
        }
    }
}

/// Approval-view classification per (employee, week), derived from the
/// weekday (Mon-Fri) item-day statuses rather than the raw weekly field.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutcome {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl ApprovalOutcome {
    fn precedence(self) -> u8 {
        match self {
            ApprovalOutcome::Approved => 3,
            // A rejected week is as "settled" as a pending one for duplicate
            // resolution; the date/hour tie-breaks decide between them.
            ApprovalOutcome::Pending | ApprovalOutcome::Rejected => 2,
            ApprovalOutcome::Draft => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRow {
    pub user_id: i32,
    pub username: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub status: SubmissionStatus,
    pub days_late: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<NaiveDateTime>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRow {
    pub user_id: i32,
    pub username: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub status: ApprovalOutcome,
    pub rejected_dates: Vec<NaiveDate>,
    pub rejection_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<NaiveDateTime>,
    pub total_hours: f64,
}

/// ✅ **Submission-status view**: Missing / Late / Submitted per employee-week
/// for all timesheets whose week starts within `[from, to]`.
pub async fn submission_status_report(
    store: &dyn TimesheetStore,
    from: NaiveDate,
    to: NaiveDate,
) -> EngineResult<Vec<SubmissionRow>> {
    let sheets = store.find_timesheets_in_range(from, to).await?;
    let mut usernames = UsernameCache::default();
    let grace = Duration::days(Config::get().late_grace_days);

    let mut rows: HashMap<(i32, NaiveDate), SubmissionRow> = HashMap::new();
    for sheet in &sheets {
        let (status, days_late) = classify_submission(sheet, grace);
        let row = SubmissionRow {
            user_id: sheet.user_id,
            username: usernames.get(store, sheet.user_id).await,
            week_start: sheet.week_start,
            week_end: sheet.week_start + Duration::days(6),
            status,
            days_late,
            submitted_at: sheet.submitted_at,
            total_hours: sheet.total_hours(),
        };

        let key = (sheet.user_id, sheet.week_start);
        match rows.get(&key) {
            Some(existing) if !submission_outranks(&row, existing) => {}
            _ => {
                rows.insert(key, row);
            }
        }
    }

    let mut result: Vec<SubmissionRow> = rows.into_values().collect();
    result.sort_by_key(|r| (r.user_id, r.week_start));
    Ok(result)
}

/// ✅ **Approval-status view**: weekday-only aggregation per employee-week,
/// with rejected dates listed explicitly and their ledger reasons attached.
pub async fn approval_status_report(
    store: &dyn TimesheetStore,
    from: NaiveDate,
    to: NaiveDate,
) -> EngineResult<Vec<ApprovalRow>> {
    let sheets = store.find_timesheets_in_range(from, to).await?;
    let mut usernames = UsernameCache::default();

    let ids: Vec<Uuid> = sheets.iter().map(|s| s.id).collect();
    let mut reasons_by_sheet: HashMap<Uuid, Vec<String>> = HashMap::new();
    for record in store.find_reject_reasons_by_timesheet_ids(&ids).await? {
        reasons_by_sheet
            .entry(record.timesheet_id)
            .or_default()
            .push(record.reason);
    }

    let mut rows: HashMap<(i32, NaiveDate), ApprovalRow> = HashMap::new();
    for sheet in &sheets {
        let (status, rejected_dates) = classify_approval(sheet);
        let row = ApprovalRow {
            user_id: sheet.user_id,
            username: usernames.get(store, sheet.user_id).await,
            week_start: sheet.week_start,
            week_end: sheet.week_start + Duration::days(6),
            status,
            rejected_dates,
            rejection_reasons: reasons_by_sheet.remove(&sheet.id).unwrap_or_default(),
            approved_at: sheet.approved_at,
            submitted_at: sheet.submitted_at,
            total_hours: sheet.total_hours(),
        };

        let key = (sheet.user_id, sheet.week_start);
        match rows.get(&key) {
            Some(existing) if !approval_outranks(&row, existing) => {}
            _ => {
                rows.insert(key, row);
            }
        }
    }

    let mut result: Vec<ApprovalRow> = rows.into_values().collect();
    result.sort_by_key(|r| (r.user_id, r.week_start));
    Ok(result)
}

fn classify_submission(sheet: &Timesheet, grace: Duration) -> (SubmissionStatus, i64) {
    if sheet.status == TimesheetStatus::Draft {
        return (SubmissionStatus::Missing, 0);
    }
    let Some(submitted_at) = sheet.submitted_at else {
        return (SubmissionStatus::Submitted, 0);
    };

    let deadline = sheet.week_start.and_time(NaiveTime::MIN) + grace;
    if submitted_at <= deadline {
        return (SubmissionStatus::Submitted, 0);
    }
    let overdue = submitted_at - deadline;
    let days_late = (overdue.num_seconds() + 86_399) / 86_400;
    (SubmissionStatus::Late, days_late)
}

/// Weekday-only "fully processed" rule: every Mon-Fri slot with hours
/// Approved -> Approved, every one Rejected -> Rejected, anything else (or a
/// never-submitted sheet) -> Pending/Draft.
fn classify_approval(sheet: &Timesheet) -> (ApprovalOutcome, Vec<NaiveDate>) {
    let mut rejected_dates: Vec<NaiveDate> = Vec::new();
    let mut seen = 0usize;
    let mut approved = 0usize;
    let mut rejected = 0usize;

    for item in sheet.items() {
        for day in 0..WEEKDAYS {
            if !item.has_hours(day) {
                continue;
            }
            seen += 1;
            match item.daily_status[day] {
                TimesheetStatus::Approved => approved += 1,
                TimesheetStatus::Rejected => {
                    rejected += 1;
                    rejected_dates.push(sheet.day_date(day));
                }
                _ => {}
            }
        }
    }
    rejected_dates.sort_unstable();
    rejected_dates.dedup();

    if sheet.status == TimesheetStatus::Draft {
        return (ApprovalOutcome::Draft, rejected_dates);
    }
    let outcome = if seen > 0 && approved == seen {
        ApprovalOutcome::Approved
    } else if seen > 0 && rejected == seen {
        ApprovalOutcome::Rejected
    } else {
        ApprovalOutcome::Pending
    };
    (outcome, rejected_dates)
}

fn submission_outranks(candidate: &SubmissionRow, incumbent: &SubmissionRow) -> bool {
    let (a, b) = (candidate.status.precedence(), incumbent.status.precedence());
    if a != b {
        return a > b;
    }
    if candidate.total_hours != incumbent.total_hours {
        return candidate.total_hours > incumbent.total_hours;
    }
    candidate.submitted_at.is_some() && incumbent.submitted_at.is_none()
}

fn approval_outranks(candidate: &ApprovalRow, incumbent: &ApprovalRow) -> bool {
    let (a, b) = (candidate.status.precedence(), incumbent.status.precedence());
    if a != b {
        return a > b;
    }
    match (candidate.approved_at.is_some(), incumbent.approved_at.is_some()) {
        (true, false) => return true,
        (false, true) => return false,
        _ => {}
    }
    match (candidate.submitted_at, incumbent.submitted_at) {
        (Some(c), Some(i)) if c != i => return c > i,
        (Some(_), None) => return true,
        (None, Some(_)) => return false,
        _ => {}
    }
    candidate.total_hours > incumbent.total_hours
}

#[derive(Default)]
struct UsernameCache {
    inner: HashMap<i32, String>,
}

impl UsernameCache {
    async fn get(&mut self, store: &dyn TimesheetStore, user_id: i32) -> String {
        if let Some(name) = self.inner.get(&user_id) {
            return name.clone();
        }
        let name = match store.find_user(user_id).await {
            Ok(Some(user)) => user.username,
            _ => format!("user-{}", user_id),
        };
        self.inner.insert(user_id, name.clone());
        name
    }
}
