use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur in notification operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Failed to serialize notification data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fire-and-forget events emitted by the workflow engine. Delivery transport
/// (websocket, e-mail, in-app inbox) lives behind the sink.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimesheetEvent {
    TimesheetSubmitted {
        supervisor_id: i32,
        employee_name: String,
        week_start: NaiveDate,
        week_end: NaiveDate,
    },
    TimesheetRejected {
        user_id: i32,
        project_name: Option<String>,
        rejected_dates: Vec<NaiveDate>,
        reason: Option<String>,
    },
    TimesheetEditRequest {
        supervisor_id: i32,
        employee_name: String,
        week_start: NaiveDate,
        week_end: NaiveDate,
        timesheet_id: Uuid,
    },
    TimesheetEditApproved {
        employee_id: i32,
        week_start: NaiveDate,
        week_end: NaiveDate,
    },
    TimesheetEditRejected {
        employee_id: i32,
        week_start: NaiveDate,
        week_end: NaiveDate,
    },
}

/// ✅ **Transport seam for push notifications**
///
/// The engine never holds connection state; it hands events to whatever sink
/// was injected and moves on.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: TimesheetEvent) -> NotificationResult<()>;
}

/// Discards every event. Default sink when no delivery channel is wired up.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn deliver(&self, _event: TimesheetEvent) -> NotificationResult<()> {
        Ok(())
    }
}

/// Captures events in memory; test double.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TimesheetEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TimesheetEvent> {
        self.events.lock().expect("recording sink poisoned").clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, event: TimesheetEvent) -> NotificationResult<()> {
        self.events
            .lock()
            .expect("recording sink poisoned")
            .push(event);
        Ok(())
    }
}

/// Best-effort dispatch: a failed delivery is logged, never propagated, and
/// never rolls back the primary mutation that produced the event.
pub(crate) async fn dispatch(sink: &dyn NotificationSink, event: TimesheetEvent) {
    if let Err(e) = sink.deliver(event).await {
        tracing::warn!("Notification delivery failed: {}", e);
    }
}
