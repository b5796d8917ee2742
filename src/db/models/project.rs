use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// External entity, read here only to derive supervision scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub employees: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}
