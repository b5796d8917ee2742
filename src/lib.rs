//! Timesheet status aggregation & approval workflow engine.
//!
//! Employees log hours against projects and teams per ISO week; supervisors
//! approve or reject individual day entries, with the per-day decisions
//! aggregating into a weekly timesheet status. A unanimous-approval edit
//! request protocol reopens locked sheets, and the report aggregator collapses
//! raw documents into one canonical row per (employee, week).
//!
//! Storage and notification transports are injected behind the
//! [`db::store::TimesheetStore`] and [`utils::notification::NotificationSink`]
//! seams; [`db::memory::InMemoryStore`] is the reference adapter.

pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod reports;
pub mod utils;

pub use crate::db::models::timesheet::{Category, Item, Timesheet, TimesheetStatus};
pub use crate::engine::status::DailyStatusUpdate;
pub use crate::engine::TimesheetEngine;
pub use crate::errors::{EngineResult, TimesheetError};

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber honoring `RUST_LOG`. Safe to call more
/// than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .try_init();
}
