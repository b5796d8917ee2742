use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use timesheet_backend::db::memory::InMemoryStore;
use timesheet_backend::db::models::edit_request::EditRequestStatus;
use timesheet_backend::db::models::project::Project;
use timesheet_backend::db::models::team::Team;
use timesheet_backend::db::models::user::{Role, User};
use timesheet_backend::reports::{approval_status_report, ApprovalOutcome};
use timesheet_backend::utils::notification::{RecordingSink, TimesheetEvent};
use timesheet_backend::{
    Category, DailyStatusUpdate, Item, Timesheet, TimesheetEngine, TimesheetError, TimesheetStatus,
};

const EMPLOYEE: i32 = 10;
const PROJECT_SUPERVISOR: i32 = 20;
const TEAM_SUPERVISOR: i32 = 21;

struct Harness {
    engine: TimesheetEngine,
    store: Arc<InMemoryStore>,
    sink: Arc<RecordingSink>,
}

async fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    store
        .insert_user(User {
            id: EMPLOYEE,
            username: "erin".to_string(),
            email: None,
            role: Role::Employee,
        })
        .await;
    store
        .insert_user(User {
            id: PROJECT_SUPERVISOR,
            username: "sam".to_string(),
            email: None,
            role: Role::Supervisor,
        })
        .await;
    store
        .insert_user(User {
            id: TEAM_SUPERVISOR,
            username: "tess".to_string(),
            email: None,
            role: Role::Supervisor,
        })
        .await;
    store
        .insert_project(Project {
            id: 1,
            name: "Apollo".to_string(),
            employees: vec![EMPLOYEE],
            supervisor: Some(PROJECT_SUPERVISOR),
            created_at: None,
        })
        .await;
    store
        .insert_team(Team {
            id: 2,
            name: "Platform".to_string(),
            members: vec![EMPLOYEE],
            supervisor: Some(TEAM_SUPERVISOR),
            created_at: None,
        })
        .await;

    let sink = Arc::new(RecordingSink::new());
    let engine = TimesheetEngine::new(store.clone(), sink.clone());
    Harness {
        engine,
        store,
        sink,
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// One project item with 8h on every weekday, 40h total.
fn weekday_item() -> Vec<Category> {
    let mut item = Item::new("Backend API", Some(1), None);
    for day in 0..5 {
        item.hours[day] = 8.0;
    }
    vec![Category {
        category: "Project".to_string(),
        items: vec![item],
    }]
}

fn day_status(sheet: &Timesheet, day: usize) -> TimesheetStatus {
    sheet.data[0].items[0].daily_status[day]
}

async fn submitted_sheet(h: &Harness) -> Timesheet {
    let sheet = h
        .engine
        .create_timesheet(EMPLOYEE, monday(), weekday_item())
        .await
        .unwrap();
    h.engine.submit(EMPLOYEE, sheet.id).await.unwrap()
}

#[tokio::test]
async fn scenario_a_submission_flips_weekdays_to_pending() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    assert_eq!(sheet.status, TimesheetStatus::Pending);
    assert_eq!(sheet.total_hours(), 40.0);
    for day in 0..5 {
        assert_eq!(day_status(&sheet, day), TimesheetStatus::Pending);
    }
    // Weekend slots have no hours and stay Draft.
    assert_eq!(day_status(&sheet, 5), TimesheetStatus::Draft);
    assert_eq!(day_status(&sheet, 6), TimesheetStatus::Draft);

    // Both hierarchies' supervisors were told about the submission.
    let submitted: Vec<i32> = h
        .sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TimesheetEvent::TimesheetSubmitted { supervisor_id, .. } => Some(supervisor_id),
            _ => None,
        })
        .collect();
    assert_eq!(submitted, vec![PROJECT_SUPERVISOR, TEAM_SUPERVISOR]);
    Ok(())
}

#[tokio::test]
async fn scenario_b_full_approval_approves_the_week() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    let sheet = h
        .engine
        .update_daily_status(
            PROJECT_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![0, 1, 2, 3, 4],
            TimesheetStatus::Approved,
            None,
        )
        .await?;
    assert_eq!(sheet.status, TimesheetStatus::Approved);

    let rows = approval_status_report(h.engine.store(), monday(), monday()).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ApprovalOutcome::Approved);
    assert_eq!(rows[0].username, "erin");
    Ok(())
}

#[tokio::test]
async fn scenario_c_single_rejected_day_rejects_the_week() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    h.engine
        .batch_update_daily_status(
            PROJECT_SUPERVISOR,
            vec![
                DailyStatusUpdate {
                    timesheet_id: sheet.id,
                    category_index: 0,
                    item_index: 0,
                    day_indices: vec![0, 1, 3, 4],
                    status: TimesheetStatus::Approved,
                    reason: None,
                },
                DailyStatusUpdate {
                    timesheet_id: sheet.id,
                    category_index: 0,
                    item_index: 0,
                    day_indices: vec![2],
                    status: TimesheetStatus::Rejected,
                    reason: Some("incomplete description".to_string()),
                },
            ],
        )
        .await?;

    let sheet = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet.status, TimesheetStatus::Rejected);
    assert_eq!(
        sheet.rejection_reason.as_deref(),
        Some("incomplete description")
    );

    let records = h
        .engine
        .store()
        .find_reject_reasons_by_timesheet_ids(&[sheet.id])
        .await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rejected_day_indices, vec![2]);
    assert_eq!(records[0].reason, "incomplete description");

    // One consolidated rejection notice carrying the Wednesday date.
    let rejected: Vec<TimesheetEvent> = h
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, TimesheetEvent::TimesheetRejected { .. }))
        .collect();
    assert_eq!(rejected.len(), 1);
    match &rejected[0] {
        TimesheetEvent::TimesheetRejected {
            user_id,
            rejected_dates,
            reason,
            project_name,
        } => {
            assert_eq!(*user_id, EMPLOYEE);
            assert_eq!(rejected_dates, &vec![monday() + chrono::Duration::days(2)]);
            assert_eq!(reason.as_deref(), Some("incomplete description"));
            assert_eq!(project_name.as_deref(), Some("Apollo"));
        }
        _ => unreachable!(),
    }
    Ok(())
}

#[tokio::test]
async fn resubmission_keeps_approved_days() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    h.engine
        .update_daily_status(
            PROJECT_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![0, 1, 3, 4],
            TimesheetStatus::Approved,
            None,
        )
        .await?;
    h.engine
        .update_daily_status(
            PROJECT_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![2],
            TimesheetStatus::Rejected,
            Some("missing ticket reference".to_string()),
        )
        .await?;

    let sheet = h.engine.submit(EMPLOYEE, sheet.id).await?;
    assert_eq!(sheet.status, TimesheetStatus::Pending);
    for day in [0, 1, 3, 4] {
        assert_eq!(day_status(&sheet, day), TimesheetStatus::Approved);
    }
    assert_eq!(day_status(&sheet, 2), TimesheetStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn scenario_d_unanimous_edit_approval_resets_to_draft() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    let request = h.engine.request_edit(EMPLOYEE, sheet.id).await?;
    assert_eq!(request.status, EditRequestStatus::Pending);
    assert_eq!(
        request.required_approvals,
        vec![PROJECT_SUPERVISOR, TEAM_SUPERVISOR]
    );
    let sheet_now = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet_now.status, TimesheetStatus::EditRequested);

    // Re-requesting returns the open request instead of duplicating it.
    let again = h.engine.request_edit(EMPLOYEE, sheet.id).await?;
    assert_eq!(again.id, request.id);

    let request = h
        .engine
        .approve_edit(PROJECT_SUPERVISOR, sheet.id)
        .await?;
    assert_eq!(request.status, EditRequestStatus::Pending);
    let sheet_now = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet_now.status, TimesheetStatus::EditRequested);

    // Same supervisor again: no-op on the approval set.
    let request = h
        .engine
        .approve_edit(PROJECT_SUPERVISOR, sheet.id)
        .await?;
    assert_eq!(request.approved_by.len(), 1);

    let request = h.engine.approve_edit(TEAM_SUPERVISOR, sheet.id).await?;
    assert_eq!(request.status, EditRequestStatus::Approved);

    let sheet_now = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet_now.status, TimesheetStatus::Draft);
    for day in 0..7 {
        assert_eq!(day_status(&sheet_now, day), TimesheetStatus::Draft);
    }
    // Content survives the reset.
    assert_eq!(sheet_now.total_hours(), 40.0);
    Ok(())
}

#[tokio::test]
async fn edit_rejection_reverts_to_pending() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    h.engine.request_edit(EMPLOYEE, sheet.id).await?;
    let request = h.engine.reject_edit(TEAM_SUPERVISOR, sheet.id).await?;
    assert_eq!(request.status, EditRequestStatus::Rejected);

    let sheet_now = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet_now.status, TimesheetStatus::Pending);

    let edit_rejected = h
        .sink
        .events()
        .into_iter()
        .any(|e| matches!(e, TimesheetEvent::TimesheetEditRejected { employee_id, .. } if employee_id == EMPLOYEE));
    assert!(edit_rejected);
    Ok(())
}

#[tokio::test]
async fn batch_round_trip_touches_only_requested_days() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    h.engine
        .batch_update_daily_status(
            PROJECT_SUPERVISOR,
            vec![DailyStatusUpdate {
                timesheet_id: sheet.id,
                category_index: 0,
                item_index: 0,
                day_indices: vec![1, 3],
                status: TimesheetStatus::Approved,
                reason: None,
            }],
        )
        .await?;

    let sheet = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    for day in 0..5 {
        let expected = if day == 1 || day == 3 {
            TimesheetStatus::Approved
        } else {
            TimesheetStatus::Pending
        };
        assert_eq!(day_status(&sheet, day), expected, "day {}", day);
    }
    Ok(())
}

#[tokio::test]
async fn batch_commits_per_timesheet_before_failing() -> Result<()> {
    let h = harness().await;
    let first = submitted_sheet(&h).await;
    let second = h
        .engine
        .create_timesheet(EMPLOYEE, monday() + chrono::Duration::days(7), weekday_item())
        .await?;
    let second = h.engine.submit(EMPLOYEE, second.id).await?;

    let err = h
        .engine
        .batch_update_daily_status(
            PROJECT_SUPERVISOR,
            vec![
                DailyStatusUpdate {
                    timesheet_id: first.id,
                    category_index: 0,
                    item_index: 0,
                    day_indices: vec![0, 1, 2, 3, 4],
                    status: TimesheetStatus::Approved,
                    reason: None,
                },
                DailyStatusUpdate {
                    timesheet_id: second.id,
                    category_index: 0,
                    item_index: 9,
                    day_indices: vec![0],
                    status: TimesheetStatus::Approved,
                    reason: None,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Validation(_)));

    // First sheet committed, second untouched.
    let first = h.engine.store().find_timesheet(first.id).await?.unwrap();
    assert_eq!(first.status, TimesheetStatus::Approved);
    let second = h.engine.store().find_timesheet(second.id).await?.unwrap();
    assert_eq!(second.status, TimesheetStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn draft_days_cannot_be_reviewed_before_submission() -> Result<()> {
    let h = harness().await;
    let sheet = h
        .engine
        .create_timesheet(EMPLOYEE, monday(), weekday_item())
        .await?;

    let err = h
        .engine
        .update_daily_status(
            PROJECT_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![0, 1, 2, 3, 4],
            TimesheetStatus::Approved,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Conflict(_)));

    let sheet = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet.status, TimesheetStatus::Draft);
    assert!(sheet.submitted_at.is_none());
    for day in 0..5 {
        assert_eq!(day_status(&sheet, day), TimesheetStatus::Draft);
    }
    Ok(())
}

#[tokio::test]
async fn review_is_blocked_while_edit_request_is_open() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;
    h.engine.request_edit(EMPLOYEE, sheet.id).await?;

    let err = h
        .engine
        .update_daily_status(
            PROJECT_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![0],
            TimesheetStatus::Approved,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Conflict(_)));

    let sheet = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(sheet.status, TimesheetStatus::EditRequested);
    assert!(h
        .engine
        .store()
        .find_pending_edit_request(sheet.id)
        .await?
        .is_some());
    Ok(())
}

#[tokio::test]
async fn zero_hour_day_cannot_be_selected() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    let err = h
        .engine
        .update_daily_status(
            PROJECT_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![5],
            TimesheetStatus::Approved,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn out_of_scope_supervisor_is_rejected_before_mutation() -> Result<()> {
    let h = harness().await;
    h.store
        .insert_user(User {
            id: 30,
            username: "uma".to_string(),
            email: None,
            role: Role::Supervisor,
        })
        .await;
    let sheet = submitted_sheet(&h).await;

    let err = h
        .engine
        .update_daily_status(30, sheet.id, 0, 0, vec![0], TimesheetStatus::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Authorization(_)));

    let sheet = h.engine.store().find_timesheet(sheet.id).await?.unwrap();
    assert_eq!(day_status(&sheet, 0), TimesheetStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn employees_cannot_review() -> Result<()> {
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    let err = h
        .engine
        .update_daily_status(
            EMPLOYEE,
            sheet.id,
            0,
            0,
            vec![0],
            TimesheetStatus::Approved,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Authorization(_)));
    Ok(())
}

#[tokio::test]
async fn team_supervisor_can_approve_cross_project_items() -> Result<()> {
    // The item belongs to a project tess does not run, but she supervises the
    // employee through the Platform team.
    let h = harness().await;
    let sheet = submitted_sheet(&h).await;

    let sheet = h
        .engine
        .update_daily_status(
            TEAM_SUPERVISOR,
            sheet.id,
            0,
            0,
            vec![0, 1, 2, 3, 4],
            TimesheetStatus::Approved,
            None,
        )
        .await?;
    assert_eq!(sheet.status, TimesheetStatus::Approved);
    Ok(())
}
