//! Order intake and status tracking
//!
//! Intake validates the payload, then checks the session binding: the order's
//! token must match the *current* token of an Occupied table. Wrong token,
//! table not occupied and unknown table all collapse into one
//! undifferentiated error so callers cannot probe session tokens.
//!
//! Tracking advances `Pending -> Served -> Completed`, with
//! `Pending | Served -> Cancelled`; Completed and Cancelled are terminal.

use std::sync::Arc;

use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::message::EventName;
use shared::util::now_millis;

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatus, TableStatus};
use crate::db::repository::{OrderRepository, TableRepository};
use crate::message::EventBroadcaster;
use crate::utils::{AppError, AppResult, validation};

/// Reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Today,
    Week,
    Month,
    Custom,
    #[default]
    All,
}

/// Query parameters for the reports endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ReportsQuery {
    #[serde(default)]
    pub period: ReportPeriod,
    /// RFC 3339 start bound, only for `period=custom`
    pub start: Option<String>,
    /// RFC 3339 end bound, only for `period=custom`
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_orders: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_order_value: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderReports {
    pub orders: Vec<Order>,
    pub summary: ReportSummary,
}

pub struct OrderService {
    orders: OrderRepository,
    tables: TableRepository,
    broadcaster: Arc<EventBroadcaster>,
}

impl OrderService {
    pub fn new(db: Surreal<Db>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            tables: TableRepository::new(db),
            broadcaster,
        }
    }

    pub fn from_state(state: &ServerState) -> Self {
        Self::new(state.db.clone(), state.broadcaster.clone())
    }

    /// Admit a new order against a table's live session
    pub async fn create(&self, payload: OrderCreate) -> AppResult<Order> {
        validation::validate_order_create(&payload)?;

        let binding_ok = match self.tables.find_by_number(payload.table_number).await? {
            Some(table) => {
                table.status == TableStatus::Occupied && table.session_token == payload.token
            }
            None => false,
        };
        if !binding_ok {
            return Err(AppError::InvalidSessionBinding);
        }

        let order = self
            .orders
            .create(Order {
                id: None,
                table_number: payload.table_number,
                items: payload.items,
                total: payload.total,
                status: OrderStatus::Pending,
                token: payload.token,
                created_at: now_millis(),
                completed_at: None,
            })
            .await?;

        self.broadcaster.publish(EventName::OrderCreated, &order);
        tracing::info!(
            table = order.table_number,
            total = %order.total,
            "Order admitted"
        );
        Ok(order)
    }

    /// Pending -> Served
    pub async fn mark_served(&self, id: &str) -> AppResult<Order> {
        match self.orders.mark_served(id).await? {
            Some(order) => {
                self.broadcaster.publish(EventName::OrderServed, &order);
                Ok(order)
            }
            None => Err(self.transition_error("serve", id, "pending").await),
        }
    }

    /// Served -> Completed, stamping the completion time
    pub async fn complete(&self, id: &str) -> AppResult<Order> {
        match self.orders.complete(id, now_millis()).await? {
            Some(order) => {
                self.broadcaster.publish(EventName::OrderCompleted, &order);
                Ok(order)
            }
            None => Err(self.transition_error("complete", id, "served").await),
        }
    }

    /// Pending | Served -> Cancelled; a completed (billed) order cannot be
    /// retracted
    pub async fn cancel(&self, id: &str) -> AppResult<Order> {
        match self.orders.cancel(id).await? {
            Some(order) => {
                self.broadcaster.publish(EventName::OrderCancelled, &order);
                Ok(order)
            }
            None => Err(self.transition_error("cancel", id, "pending or served").await),
        }
    }

    /// A failed conditional transition is NotFound for a missing record and
    /// InvalidState otherwise
    async fn transition_error(&self, op: &str, id: &str, expected: &str) -> AppError {
        match self.orders.find_by_id(id).await {
            Ok(Some(order)) => AppError::invalid_state(format!(
                "{op} order {id}: expected status {expected}, actual {:?}",
                order.status
            )),
            Ok(None) => AppError::not_found(format!("Order {id} not found")),
            Err(e) => e.into(),
        }
    }

    /// Pending orders, oldest first (kitchen queue)
    pub async fn find_pending(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_by_status(OrderStatus::Pending).await?)
    }

    /// Served orders, oldest first
    pub async fn find_served(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_by_status(OrderStatus::Served).await?)
    }

    /// All orders, newest first
    pub async fn find_all(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all().await?)
    }

    /// Revenue reports over completed orders
    pub async fn reports(&self, query: ReportsQuery) -> AppResult<OrderReports> {
        let (since, until) = Self::date_range(&query)?;
        let orders = self.orders.find_completed_between(since, until).await?;

        let total_orders = orders.len() as u64;
        let total_revenue: Decimal = orders.iter().map(|o| o.total).sum();
        let avg_order_value = if total_orders == 0 {
            Decimal::ZERO
        } else {
            total_revenue / Decimal::from(total_orders)
        };

        Ok(OrderReports {
            orders,
            summary: ReportSummary {
                total_revenue,
                total_orders,
                avg_order_value,
            },
        })
    }

    /// Administrative bulk reset: delete every order
    pub async fn reset_all(&self) -> AppResult<u64> {
        let deleted = self.orders.delete_all().await?;
        tracing::warn!(deleted, "All orders reset");
        Ok(deleted)
    }

    fn date_range(query: &ReportsQuery) -> AppResult<(Option<i64>, Option<i64>)> {
        const DAY_MS: i64 = 86_400_000;
        let now = now_millis();

        match query.period {
            ReportPeriod::Today => Ok((Some(now - now.rem_euclid(DAY_MS)), None)),
            ReportPeriod::Week => Ok((Some(now - 7 * DAY_MS), None)),
            ReportPeriod::Month => Ok((Some(now - 30 * DAY_MS), None)),
            ReportPeriod::Custom => match (&query.start, &query.end) {
                (Some(start), Some(end)) => Ok((
                    Some(Self::parse_timestamp(start)?),
                    Some(Self::parse_timestamp(end)?),
                )),
                // Incomplete custom range falls back to the full history
                _ => Ok((None, None)),
            },
            ReportPeriod::All => Ok((None, None)),
        }
    }

    fn parse_timestamp(value: &str) -> AppResult<i64> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.timestamp_millis())
            .map_err(|e| AppError::validation(format!("Invalid timestamp '{value}': {e}")))
    }
}
