//! Dining Table Repository
//!
//! Every lifecycle transition is a single conditional update: the statement
//! matches the table by number together with the expected current status, so
//! a concurrent transition makes the match fail (empty result) instead of
//! corrupting state. Callers translate an empty result into
//! NotFound/InvalidState after re-reading the record.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Table, TableStatus};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct TableRepository {
    base: BaseRepository,
}

impl TableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All tables ordered by number
    pub async fn find_all(&self) -> RepoResult<Vec<Table>> {
        let tables: Vec<Table> = self
            .base
            .db()
            .query("SELECT * FROM dining_table ORDER BY number")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by its physical number
    pub async fn find_by_number(&self, number: u32) -> RepoResult<Option<Table>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE number = $number LIMIT 1")
            .bind(("number", number))
            .await?;
        let tables: Vec<Table> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a table record (seed time only)
    pub async fn create(&self, number: u32) -> RepoResult<Table> {
        let created: Option<Table> = self
            .base
            .db()
            .create(TABLE)
            .content(Table::available(number))
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Available -> Occupied, installing fresh session credentials.
    ///
    /// Returns None when the table is missing or not currently Available.
    pub async fn begin_session(
        &self,
        number: u32,
        token: String,
        url: String,
        qr_image: String,
    ) -> RepoResult<Option<Table>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE dining_table SET status = 'occupied', session_token = $token, \
                 session_url = $url, session_qr_image = $qr_image, \
                 aggregate_total = $zero, order_refs = [] \
                 WHERE number = $number AND status = 'available' RETURN AFTER",
            )
            .bind(("number", number))
            .bind(("token", token))
            .bind(("url", url))
            .bind(("qr_image", qr_image))
            .bind(("zero", 0.0_f64))
            .await?;
        let tables: Vec<Table> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Occupied -> Checkout with the aggregation snapshot.
    ///
    /// Returns None when the table is missing or not currently Occupied.
    pub async fn enter_checkout(
        &self,
        number: u32,
        aggregate_total: Decimal,
        order_refs: Vec<String>,
    ) -> RepoResult<Option<Table>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE dining_table SET status = 'checkout', \
                 aggregate_total = $aggregate_total, order_refs = $order_refs \
                 WHERE number = $number AND status = 'occupied' RETURN AFTER",
            )
            .bind(("number", number))
            // Money fields are stored as plain numbers; bind the f64 form
            .bind(("aggregate_total", aggregate_total.to_f64().unwrap_or_default()))
            .bind(("order_refs", order_refs))
            .await?;
        let tables: Vec<Table> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Conditional reset to Available, applied only from `expected`.
    pub async fn reset_from(
        &self,
        number: u32,
        expected: TableStatus,
    ) -> RepoResult<Option<Table>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE dining_table SET status = 'available', session_token = '', \
                 session_url = '', session_qr_image = '', aggregate_total = $zero, \
                 order_refs = [] \
                 WHERE number = $number AND status = $expected RETURN AFTER",
            )
            .bind(("number", number))
            .bind(("expected", expected))
            .bind(("zero", 0.0_f64))
            .await?;
        let tables: Vec<Table> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Unconditional reset to Available (staff escape hatch).
    ///
    /// Returns None only when the table number is unknown.
    pub async fn reset(&self, number: u32) -> RepoResult<Option<Table>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE dining_table SET status = 'available', session_token = '', \
                 session_url = '', session_qr_image = '', aggregate_total = $zero, \
                 order_refs = [] \
                 WHERE number = $number RETURN AFTER",
            )
            .bind(("number", number))
            .bind(("zero", 0.0_f64))
            .await?;
        let tables: Vec<Table> = result.take(0)?;
        Ok(tables.into_iter().next())
    }
}
