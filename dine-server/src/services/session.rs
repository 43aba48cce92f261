//! Table session lifecycle
//!
//! A table cycles `Available -> Occupied -> Checkout -> Available`. Opening
//! a session issues a single-use token plus QR artifacts; checkout
//! aggregates the session's served orders onto the table; completing
//! checkout finalizes those orders and releases the table.
//!
//! There is no lock across the Table/Order pair: every transition is one
//! conditional update, and the checkout snapshot race (an order served after
//! aggregation ran) is accepted and resolved by re-running checkout.

use std::sync::Arc;

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use shared::message::EventName;
use shared::util::now_millis;

use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus, Table, TableStatus};
use crate::db::repository::{OrderRepository, TableRepository};
use crate::message::EventBroadcaster;
use crate::services::qr;
use crate::utils::{AppError, AppResult};

pub struct SessionService {
    tables: TableRepository,
    orders: OrderRepository,
    broadcaster: Arc<EventBroadcaster>,
    frontend_url: String,
}

impl SessionService {
    pub fn new(
        db: Surreal<Db>,
        broadcaster: Arc<EventBroadcaster>,
        frontend_url: String,
    ) -> Self {
        Self {
            tables: TableRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            broadcaster,
            frontend_url,
        }
    }

    pub fn from_state(state: &ServerState) -> Self {
        Self::new(
            state.db.clone(),
            state.broadcaster.clone(),
            state.config.frontend_url.clone(),
        )
    }

    /// All tables ordered by number
    pub async fn list_tables(&self) -> AppResult<Vec<Table>> {
        Ok(self.tables.find_all().await?)
    }

    /// 开台: Available -> Occupied with fresh session credentials
    pub async fn activate(&self, number: u32) -> AppResult<Table> {
        let table = self
            .tables
            .find_by_number(number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {number} not found")))?;

        let token = Uuid::new_v4().to_string();
        let url = qr::session_url(&self.frontend_url, number, &token);
        let image = qr::qr_data_url(&url)?;

        let Some(updated) = self
            .tables
            .begin_session(number, token, url, image)
            .await?
        else {
            return Err(AppError::invalid_state(format!(
                "activate table {number}: expected status available, actual {:?}",
                table.status
            )));
        };

        self.broadcaster.publish(
            EventName::TableActivated,
            &serde_json::json!({ "table_number": number }),
        );
        tracing::info!(table = number, "Table session opened");
        Ok(updated)
    }

    /// 进入结账: Occupied -> Checkout, aggregating the session's served orders
    ///
    /// Read-then-write: an order that becomes served after the aggregation
    /// query ran is excluded until checkout is re-run. Staff re-enter
    /// checkout to refresh the bill.
    pub async fn start_checkout(&self, number: u32) -> AppResult<Table> {
        let table = self
            .tables
            .find_by_number(number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {number} not found")))?;

        // Scope by (number, current token) so a previous session's orders
        // can never be summed into this bill
        let served = self
            .orders
            .find_session_by_status(number, table.session_token.clone(), OrderStatus::Served)
            .await?;

        let aggregate_total: Decimal = served.iter().map(|o| o.total).sum();
        let order_refs: Vec<String> = served
            .iter()
            .filter_map(|o| o.id.as_ref().map(|id| id.to_string()))
            .collect();

        let Some(updated) = self
            .tables
            .enter_checkout(number, aggregate_total, order_refs)
            .await?
        else {
            return Err(AppError::invalid_state(format!(
                "start checkout on table {number}: expected status occupied, actual {:?}",
                table.status
            )));
        };

        self.broadcaster.publish(
            EventName::TableCheckoutStarted,
            &serde_json::json!({ "table_number": number }),
        );
        tracing::info!(
            table = number,
            aggregate_total = %updated.aggregate_total,
            orders = updated.order_refs.len(),
            "Checkout started"
        );
        Ok(updated)
    }

    /// 结账完成: finalize the session's served orders, release the table
    ///
    /// The order bulk update runs before the table reset; a crash in between
    /// leaves the table in Checkout with its orders already Completed, and
    /// re-invoking repeats the (now empty) bulk update and still resets —
    /// the operation is idempotent.
    pub async fn complete_checkout(&self, number: u32) -> AppResult<Table> {
        let table = self
            .tables
            .find_by_number(number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {number} not found")))?;

        if table.status != TableStatus::Checkout {
            return Err(AppError::invalid_state(format!(
                "complete checkout on table {number}: expected status checkout, actual {:?}",
                table.status
            )));
        }

        let completed = self
            .orders
            .complete_served(number, table.session_token.clone(), now_millis())
            .await?;
        tracing::debug!(table = number, completed = completed.len(), "Orders finalized");

        let Some(updated) = self.tables.reset_from(number, TableStatus::Checkout).await? else {
            return Err(AppError::invalid_state(format!(
                "complete checkout on table {number}: table left checkout concurrently"
            )));
        };

        self.broadcaster.publish(
            EventName::TableCheckoutCompleted,
            &serde_json::json!({ "table_number": number }),
        );
        tracing::info!(table = number, "Checkout completed, table released");
        Ok(updated)
    }

    /// 强制重置: back to Available from any state, orders untouched
    pub async fn force_reset(&self, number: u32) -> AppResult<Table> {
        let updated = self
            .tables
            .reset(number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {number} not found")))?;

        self.broadcaster.publish(
            EventName::TableForceReset,
            &serde_json::json!({ "table_number": number }),
        );
        tracing::warn!(table = number, "Table force reset");
        Ok(updated)
    }

    /// Pending and served orders of the table's current session, newest first
    pub async fn session_orders(&self, number: u32) -> AppResult<Vec<Order>> {
        let table = self
            .tables
            .find_by_number(number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {number} not found")))?;

        if table.session_token.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .orders
            .find_session_live(number, table.session_token)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed;
    use surrealdb::engine::local::Mem;

    async fn setup() -> (SessionService, OrderRepository, Arc<EventBroadcaster>) {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        seed::seed_tables(&db, 3).await.unwrap();

        let broadcaster = Arc::new(EventBroadcaster::new());
        let service = SessionService::new(
            db.clone(),
            broadcaster.clone(),
            "http://localhost:4200".to_string(),
        );
        (service, OrderRepository::new(db), broadcaster)
    }

    fn order(table_number: u32, token: &str, status: OrderStatus, total: i64) -> Order {
        Order {
            id: None,
            table_number,
            items: vec![crate::db::models::OrderItem {
                menu_item_id: "menu_item:tea".to_string(),
                name: "Jasmine Tea".to_string(),
                price: Decimal::from(total),
                quantity: 1,
                customization: None,
                subtotal: Decimal::from(total),
            }],
            total: Decimal::from(total),
            status,
            token: token.to_string(),
            created_at: now_millis(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_activate_issues_session() {
        let (service, _orders, broadcaster) = setup().await;
        let mut rx = broadcaster.subscribe();

        let table = service.activate(1).await.unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert!(!table.session_token.is_empty());
        assert!(
            table
                .session_url
                .contains(&format!("table=1&token={}", table.session_token))
        );
        assert!(table.session_qr_image.starts_with("data:image/png;base64,"));
        assert_eq!(table.aggregate_total, Decimal::ZERO);
        assert!(table.order_refs.is_empty());

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event, EventName::TableActivated);
        assert_eq!(event.payload["table_number"], 1);
    }

    #[tokio::test]
    async fn test_activate_twice_fails_and_leaves_state() {
        let (service, _orders, _broadcaster) = setup().await;

        let first = service.activate(1).await.unwrap();
        let err = service.activate(1).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        // The session issued by the first call is untouched
        let tables = service.list_tables().await.unwrap();
        let table = tables.iter().find(|t| t.number == 1).unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(table.session_token, first.session_token);
    }

    #[tokio::test]
    async fn test_activate_unknown_table() {
        let (service, _orders, _broadcaster) = setup().await;
        let err = service.activate(99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_start_checkout_requires_occupied() {
        let (service, _orders, _broadcaster) = setup().await;
        let err = service.start_checkout(3).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_checkout_aggregates_served_orders_of_current_session() {
        let (service, orders, _broadcaster) = setup().await;
        let token = service.activate(1).await.unwrap().session_token;

        let served_a = orders
            .create(order(1, &token, OrderStatus::Served, 200))
            .await
            .unwrap();
        orders
            .create(order(1, &token, OrderStatus::Pending, 50))
            .await
            .unwrap();
        let served_b = orders
            .create(order(1, &token, OrderStatus::Served, 30))
            .await
            .unwrap();
        orders
            .create(order(1, &token, OrderStatus::Cancelled, 70))
            .await
            .unwrap();
        // A leftover from a previous session must never be counted
        orders
            .create(order(1, "stale-token", OrderStatus::Served, 999))
            .await
            .unwrap();

        let table = service.start_checkout(1).await.unwrap();
        assert_eq!(table.status, TableStatus::Checkout);
        assert_eq!(table.aggregate_total, Decimal::from(230));
        assert_eq!(table.order_refs.len(), 2);
        assert!(
            table
                .order_refs
                .contains(&served_a.id.as_ref().unwrap().to_string())
        );
        assert!(
            table
                .order_refs
                .contains(&served_b.id.as_ref().unwrap().to_string())
        );
    }

    #[tokio::test]
    async fn test_complete_checkout_finalizes_and_releases() {
        let (service, orders, _broadcaster) = setup().await;
        let token = service.activate(1).await.unwrap().session_token;

        let served = orders
            .create(order(1, &token, OrderStatus::Served, 200))
            .await
            .unwrap();
        let pending = orders
            .create(order(1, &token, OrderStatus::Pending, 50))
            .await
            .unwrap();

        service.start_checkout(1).await.unwrap();
        let table = service.complete_checkout(1).await.unwrap();

        assert_eq!(table.status, TableStatus::Available);
        assert!(table.session_token.is_empty());
        assert!(table.session_url.is_empty());
        assert!(table.session_qr_image.is_empty());
        assert_eq!(table.aggregate_total, Decimal::ZERO);
        assert!(table.order_refs.is_empty());

        let finalized = orders
            .find_by_id(&served.id.as_ref().unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(finalized.status, OrderStatus::Completed);
        assert!(finalized.completed_at.is_some());

        // Only served orders are finalized
        let leftover = orders
            .find_by_id(&pending.id.as_ref().unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(leftover.status, OrderStatus::Pending);
        assert!(leftover.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_complete_checkout_requires_checkout_state() {
        let (service, _orders, _broadcaster) = setup().await;
        service.activate(1).await.unwrap();

        let err = service.complete_checkout(1).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_complete_checkout_is_reenterable() {
        let (service, orders, _broadcaster) = setup().await;
        let token = service.activate(1).await.unwrap().session_token;
        orders
            .create(order(1, &token, OrderStatus::Served, 120))
            .await
            .unwrap();
        service.start_checkout(1).await.unwrap();

        // Simulate a crash after the order bulk update but before the table
        // reset: the orders are already completed, the table still Checkout
        orders
            .complete_served(1, token.clone(), now_millis())
            .await
            .unwrap();

        let table = service.complete_checkout(1).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_force_reset_from_any_state() {
        let (service, orders, broadcaster) = setup().await;
        let token = service.activate(2).await.unwrap().session_token;
        let pending = orders
            .create(order(2, &token, OrderStatus::Pending, 10))
            .await
            .unwrap();

        let mut rx = broadcaster.subscribe();
        let table = service.force_reset(2).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
        assert!(table.session_token.is_empty());

        // Associated orders keep their status
        let untouched = orders
            .find_by_id(&pending.id.as_ref().unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, OrderStatus::Pending);

        assert_eq!(rx.try_recv().unwrap().event, EventName::TableForceReset);
    }

    #[tokio::test]
    async fn test_session_orders_scope_and_order() {
        let (service, orders, _broadcaster) = setup().await;
        let token = service.activate(1).await.unwrap().session_token;

        orders
            .create(order(1, &token, OrderStatus::Pending, 10))
            .await
            .unwrap();
        orders
            .create(order(1, &token, OrderStatus::Served, 20))
            .await
            .unwrap();
        orders
            .create(order(1, &token, OrderStatus::Cancelled, 30))
            .await
            .unwrap();
        orders
            .create(order(1, "stale-token", OrderStatus::Pending, 40))
            .await
            .unwrap();

        let live = service.session_orders(1).await.unwrap();
        assert_eq!(live.len(), 2);
        assert!(
            live.iter()
                .all(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Served))
        );
        assert!(live.iter().all(|o| o.token == token));
    }

    #[tokio::test]
    async fn test_session_orders_empty_without_session() {
        let (service, _orders, _broadcaster) = setup().await;
        let live = service.session_orders(1).await.unwrap();
        assert!(live.is_empty());
    }
}
