//! Order Repository
//!
//! Status transitions are conditional updates keyed on the current status;
//! an empty result means the precondition failed (or the record is gone) and
//! the caller decides between NotFound and InvalidState.
//!
//! The underlying table is named `orders` to stay clear of the ORDER keyword
//! in raw statements.

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderStatus};

const TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn parse_id(id: &str) -> Result<RecordId, RepoError> {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = Self::parse_id(id)?;
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// All orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Global status list, oldest first (kitchen/service queue order)
    pub async fn find_by_status(&self, status: OrderStatus) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE status = $status ORDER BY created_at ASC")
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders of one session in a given status, oldest first.
    ///
    /// The (table_number, token) pair scopes the query to a single occupancy
    /// session; matching on the number alone would leak previous sessions.
    pub async fn find_session_by_status(
        &self,
        table_number: u32,
        token: String,
        status: OrderStatus,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE table_number = $table_number \
                 AND token = $token AND status = $status ORDER BY created_at ASC",
            )
            .bind(("table_number", table_number))
            .bind(("token", token))
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Live (pending or served) orders of one session, newest first
    pub async fn find_session_live(
        &self,
        table_number: u32,
        token: String,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE table_number = $table_number \
                 AND token = $token AND status IN ['pending', 'served'] \
                 ORDER BY created_at DESC",
            )
            .bind(("table_number", table_number))
            .bind(("token", token))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Pending -> Served. None when the order is missing or not Pending.
    pub async fn mark_served(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = 'served' WHERE status = 'pending' RETURN AFTER")
            .bind(("thing", rid))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Served -> Completed, stamping the completion time.
    pub async fn complete(&self, id: &str, completed_at: i64) -> RepoResult<Option<Order>> {
        let rid = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'completed', completed_at = $completed_at \
                 WHERE status = 'served' RETURN AFTER",
            )
            .bind(("thing", rid))
            .bind(("completed_at", completed_at))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Pending | Served -> Cancelled. Completed and Cancelled are terminal.
    pub async fn cancel(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'cancelled' \
                 WHERE status IN ['pending', 'served'] RETURN AFTER",
            )
            .bind(("thing", rid))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Bulk checkout completion: every served order of the session becomes
    /// Completed. Returns the affected orders (empty on re-invocation).
    pub async fn complete_served(
        &self,
        table_number: u32,
        token: String,
        completed_at: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "UPDATE orders SET status = 'completed', completed_at = $completed_at \
                 WHERE table_number = $table_number AND token = $token \
                 AND status = 'served' RETURN AFTER",
            )
            .bind(("table_number", table_number))
            .bind(("token", token))
            .bind(("completed_at", completed_at))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Completed orders within an optional completion-time range, newest
    /// first (reports)
    pub async fn find_completed_between(
        &self,
        since: Option<i64>,
        until: Option<i64>,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE status = 'completed' \
                 AND completed_at >= $since AND completed_at <= $until \
                 ORDER BY completed_at DESC",
            )
            .bind(("since", since.unwrap_or(i64::MIN)))
            .bind(("until", until.unwrap_or(i64::MAX)))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Administrative bulk reset: delete every order. Returns the count.
    pub async fn delete_all(&self) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("DELETE orders RETURN BEFORE")
            .await?;
        let deleted: Vec<Order> = result.take(0)?;
        Ok(deleted.len() as u64)
    }
}
