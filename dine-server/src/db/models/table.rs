//! Dining Table Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Table occupancy status
///
/// `Available -> Occupied -> Checkout -> Available`, with a force reset
/// allowed from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
    Checkout,
}

/// Dining table entity (桌台)
///
/// `session_token` is non-empty exactly while the table is Occupied or in
/// Checkout; `aggregate_total` and `order_refs` only carry data during
/// Checkout and are cleared on every reset to Available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// Physical table number, unique and immutable after seeding
    pub number: u32,
    pub status: TableStatus,
    /// Single-use session credential
    #[serde(default)]
    pub session_token: String,
    /// Guest ordering URL embedding (number, token)
    #[serde(default)]
    pub session_url: String,
    /// base64 PNG data URL rendering of `session_url`
    #[serde(default)]
    pub session_qr_image: String,
    /// Sum of served orders captured when checkout started
    #[serde(default, with = "rust_decimal::serde::float")]
    pub aggregate_total: Decimal,
    /// Snapshot of the aggregated order ids (not a live reference set)
    #[serde(default)]
    pub order_refs: Vec<String>,
}

impl Table {
    /// A fresh available table (seed time)
    pub fn available(number: u32) -> Self {
        Self {
            id: None,
            number,
            status: TableStatus::Available,
            session_token: String::new(),
            session_url: String::new(),
            session_qr_image: String::new(),
            aggregate_total: Decimal::ZERO,
            order_refs: Vec::new(),
        }
    }
}
