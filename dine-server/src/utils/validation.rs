//! Input validation helpers
//!
//! Centralized limits and validation for request payloads. Validation runs
//! before any persistence attempt; storage enforces none of these rules.

use rust_decimal::Decimal;

use crate::db::models::OrderCreate;
use crate::utils::AppError;

// ── Limits ──────────────────────────────────────────────────────────

/// Entity names and identifiers: item names, menu ids, tokens
pub const MAX_NAME_LEN: usize = 200;

/// Line items per order
pub const MAX_ITEMS_PER_ORDER: usize = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate an order creation payload.
///
/// Field constraints plus the intake invariant: `total` must equal the sum
/// of the item subtotals exactly.
pub fn validate_order_create(payload: &OrderCreate) -> Result<(), AppError> {
    if payload.table_number < 1 {
        return Err(AppError::validation(
            "table_number must be a positive integer",
        ));
    }
    validate_required_text(&payload.token, "token", MAX_NAME_LEN)?;

    if payload.items.is_empty() {
        return Err(AppError::validation("items must not be empty"));
    }
    if payload.items.len() > MAX_ITEMS_PER_ORDER {
        return Err(AppError::validation(format!(
            "too many items ({}, max {MAX_ITEMS_PER_ORDER})",
            payload.items.len()
        )));
    }

    for (idx, item) in payload.items.iter().enumerate() {
        validate_required_text(&item.menu_item_id, &format!("items[{idx}].menu_item_id"), MAX_NAME_LEN)?;
        validate_required_text(&item.name, &format!("items[{idx}].name"), MAX_NAME_LEN)?;
        if item.quantity < 1 {
            return Err(AppError::validation(format!(
                "items[{idx}].quantity must be at least 1"
            )));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "items[{idx}].price must not be negative"
            )));
        }
        if item.subtotal < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "items[{idx}].subtotal must not be negative"
            )));
        }
    }

    if payload.total < Decimal::ZERO {
        return Err(AppError::validation("total must not be negative"));
    }

    let sum: Decimal = payload.items.iter().map(|i| i.subtotal).sum();
    if payload.total != sum {
        return Err(AppError::validation(format!(
            "total {} does not match the sum of item subtotals {}",
            payload.total, sum
        )));
    }

    Ok(())
}
