//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order service status
///
/// `Pending -> Served -> Completed`, with `Pending | Served -> Cancelled`.
/// Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Served,
    Completed,
    Cancelled,
}

/// Single order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Menu catalog reference (opaque to this service)
    pub menu_item_id: String,
    pub name: String,
    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    /// Opaque per-item options (spiciness, toppings, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Guest order
///
/// `token` is copied from the table at creation time and scopes the order to
/// exactly one occupancy session of `table_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub table_number: u32,
    pub items: Vec<OrderItem>,
    /// Sum of item subtotals, validated at intake
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    /// Session token binding the order to one table occupancy
    pub token: String,
    /// Creation time (UNIX ms)
    pub created_at: i64,
    /// Completion time (UNIX ms), set only on transition to Completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_number: u32,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub token: String,
}
