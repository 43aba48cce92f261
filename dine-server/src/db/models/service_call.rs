//! Service Call Model (呼叫服务)

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Service call state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCallStatus {
    Pending,
    Handled,
}

/// A guest's call for staff attention; at most one pending call per table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCall {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub table_number: u32,
    pub status: ServiceCallStatus,
    /// Creation time (UNIX ms)
    pub created_at: i64,
    /// Handling time (UNIX ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_at: Option<i64>,
}

/// Create service call payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCallCreate {
    pub table_number: u32,
}
