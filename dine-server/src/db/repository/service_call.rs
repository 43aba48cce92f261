//! Service Call Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::ServiceCall;

const TABLE: &str = "service_call";

#[derive(Clone)]
pub struct ServiceCallRepository {
    base: BaseRepository,
}

impl ServiceCallRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn parse_id(id: &str) -> Result<RecordId, RepoError> {
        id.parse()
            .map_err(|_| RepoError::NotFound(format!("Service call {} not found", id)))
    }

    /// Persist a new service call
    pub async fn create(&self, call: ServiceCall) -> RepoResult<ServiceCall> {
        let created: Option<ServiceCall> = self.base.db().create(TABLE).content(call).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create service call".to_string()))
    }

    /// The open pending call for a table, if any
    pub async fn find_pending_for_table(
        &self,
        table_number: u32,
    ) -> RepoResult<Option<ServiceCall>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM service_call WHERE table_number = $table_number \
                 AND status = 'pending' LIMIT 1",
            )
            .bind(("table_number", table_number))
            .await?;
        let calls: Vec<ServiceCall> = result.take(0)?;
        Ok(calls.into_iter().next())
    }

    /// All pending calls, oldest first
    pub async fn find_pending(&self) -> RepoResult<Vec<ServiceCall>> {
        let calls: Vec<ServiceCall> = self
            .base
            .db()
            .query(
                "SELECT * FROM service_call WHERE status = 'pending' ORDER BY created_at ASC",
            )
            .await?
            .take(0)?;
        Ok(calls)
    }

    /// Pending -> Handled, stamping the handling time.
    ///
    /// None when the call is missing or already handled.
    pub async fn handle(&self, id: &str, handled_at: i64) -> RepoResult<Option<ServiceCall>> {
        let rid = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'handled', handled_at = $handled_at \
                 WHERE status = 'pending' RETURN AFTER",
            )
            .bind(("thing", rid))
            .bind(("handled_at", handled_at))
            .await?;
        let calls: Vec<ServiceCall> = result.take(0)?;
        Ok(calls.into_iter().next())
    }
}
