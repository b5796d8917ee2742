use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of day slots every item carries, Monday-anchored (index 0 = Monday).
pub const DAYS_PER_WEEK: usize = 7;

/// Weekday slots considered by the approval report (Mon-Fri).
pub const WEEKDAYS: usize = 5;

/// ✅ **Status shared by the weekly timesheet and every item-day**
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    EditRequested,
}

impl std::fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimesheetStatus::Draft => write!(f, "draft"),
            TimesheetStatus::Pending => write!(f, "pending"),
            TimesheetStatus::Approved => write!(f, "approved"),
            TimesheetStatus::Rejected => write!(f, "rejected"),
            TimesheetStatus::EditRequested => write!(f, "edit_requested"),
        }
    }
}

impl std::str::FromStr for TimesheetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(TimesheetStatus::Draft),
            "pending" => Ok(TimesheetStatus::Pending),
            "approved" => Ok(TimesheetStatus::Approved),
            "rejected" => Ok(TimesheetStatus::Rejected),
            "edit_requested" => Ok(TimesheetStatus::EditRequested),
            _ => Err(format!("Invalid timesheet status: {}", s)),
        }
    }
}

/// A unit of work within a category: one label plus 7 day slots of
/// hours/descriptions/statuses. `project_id`/`team_id` tie the item into the
/// supervision hierarchies; items with neither are "Other" work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub work: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i32>,
    pub hours: [f64; DAYS_PER_WEEK],
    pub descriptions: [String; DAYS_PER_WEEK],
    pub daily_status: [TimesheetStatus; DAYS_PER_WEEK],
}

impl Item {
    pub fn new(work: impl Into<String>, project_id: Option<i32>, team_id: Option<i32>) -> Self {
        Self {
            work: work.into(),
            project_id,
            team_id,
            hours: [0.0; DAYS_PER_WEEK],
            descriptions: std::array::from_fn(|_| String::new()),
            daily_status: [TimesheetStatus::Draft; DAYS_PER_WEEK],
        }
    }

    /// A day with zero hours is never a candidate for a status transition.
    pub fn has_hours(&self, day: usize) -> bool {
        day < DAYS_PER_WEEK && self.hours[day] > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category: String,
    pub items: Vec<Item>,
}

/// ✅ **One timesheet per (employee, ISO week)**
///
/// `week_start` is always the Monday of its week. `status` is a pure function
/// of the item-day statuses and is recomputed after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: Uuid,
    pub user_id: i32,
    pub week_start: NaiveDate,
    pub status: TimesheetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<NaiveDateTime>,
    pub data: Vec<Category>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Monday of the ISO week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl Timesheet {
    pub fn new(user_id: i32, week_start: NaiveDate, data: Vec<Category>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            user_id,
            week_start: week_start_of(week_start),
            status: TimesheetStatus::Draft,
            rejection_reason: None,
            submitted_at: None,
            approved_at: None,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Monday..Sunday bounds of the covered week.
    pub fn week_bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.week_start, self.week_start + Duration::days(6))
    }

    /// Calendar date of a 0-based day slot.
    pub fn day_date(&self, day: usize) -> NaiveDate {
        self.week_start + Duration::days(day as i64)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.data.iter().flat_map(|c| c.items.iter())
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.data.iter_mut().flat_map(|c| c.items.iter_mut())
    }

    /// Sum of every day slot across all items, rounded to 2 decimal places.
    pub fn total_hours(&self) -> f64 {
        let sum: f64 = self.items().flat_map(|i| i.hours.iter()).sum();
        round2(sum)
    }

    /// Recompute the weekly status from the item-day statuses.
    ///
    /// Only days with nonzero hours count. While any such day is still Draft
    /// or Pending the weekly status stays Draft (never submitted) or Pending
    /// (submitted, in review). Once every countable day is terminal the week
    /// collapses to Approved iff all are Approved, otherwise Rejected with
    /// `last_reason` recorded as the weekly rejection reason.
    pub fn recompute_weekly_status(&mut self, last_reason: Option<&str>) {
        let mut any = false;
        let mut all_approved = true;
        let mut fully_processed = true;

        for item in self.items() {
            for day in 0..DAYS_PER_WEEK {
                if !item.has_hours(day) {
                    continue;
                }
                any = true;
                match item.daily_status[day] {
                    TimesheetStatus::Approved => {}
                    TimesheetStatus::Rejected => all_approved = false,
                    _ => {
                        fully_processed = false;
                        all_approved = false;
                    }
                }
            }
        }

        if !any || !fully_processed {
            if self.status != TimesheetStatus::Draft {
                self.status = TimesheetStatus::Pending;
            }
            self.approved_at = None;
        } else if all_approved {
            self.status = TimesheetStatus::Approved;
            self.approved_at = Some(Utc::now().naive_utc());
        } else {
            self.status = TimesheetStatus::Rejected;
            self.approved_at = None;
            if let Some(reason) = last_reason {
                self.rejection_reason = Some(reason.to_string());
            }
        }
    }
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
