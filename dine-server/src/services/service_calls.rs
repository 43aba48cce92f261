//! Service calls (呼叫服务)
//!
//! A guest raises a call for staff attention; staff mark it handled. At most
//! one pending call per table — raising again just returns the open call.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::message::EventName;
use shared::util::now_millis;

use crate::core::ServerState;
use crate::db::models::{ServiceCall, ServiceCallStatus};
use crate::db::repository::ServiceCallRepository;
use crate::message::EventBroadcaster;
use crate::utils::{AppError, AppResult};

pub struct ServiceCallService {
    calls: ServiceCallRepository,
    broadcaster: Arc<EventBroadcaster>,
}

impl ServiceCallService {
    pub fn new(db: Surreal<Db>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self {
            calls: ServiceCallRepository::new(db),
            broadcaster,
        }
    }

    pub fn from_state(state: &ServerState) -> Self {
        Self::new(state.db.clone(), state.broadcaster.clone())
    }

    /// Raise a call; returns the already-open call if one exists.
    ///
    /// Two concurrent raises may briefly create two pending calls; staff
    /// handling either one is acceptable, so no uniqueness is enforced by
    /// storage.
    pub async fn create(&self, table_number: u32) -> AppResult<ServiceCall> {
        if table_number < 1 {
            return Err(AppError::validation(
                "table_number must be a positive integer",
            ));
        }

        let call = match self.calls.find_pending_for_table(table_number).await? {
            Some(existing) => existing,
            None => {
                self.calls
                    .create(ServiceCall {
                        id: None,
                        table_number,
                        status: ServiceCallStatus::Pending,
                        created_at: now_millis(),
                        handled_at: None,
                    })
                    .await?
            }
        };

        self.broadcaster.publish(EventName::ServiceCallCreated, &call);
        tracing::info!(table = table_number, "Service call raised");
        Ok(call)
    }

    /// All pending calls, oldest first
    pub async fn find_pending(&self) -> AppResult<Vec<ServiceCall>> {
        Ok(self.calls.find_pending().await?)
    }

    /// Mark a call handled. Unknown id and already-handled both yield
    /// NotFound, matching the single conditional update underneath.
    pub async fn handle(&self, id: &str) -> AppResult<ServiceCall> {
        match self.calls.handle(id, now_millis()).await? {
            Some(call) => {
                self.broadcaster.publish(EventName::ServiceCallHandled, &call);
                tracing::info!(table = call.table_number, "Service call handled");
                Ok(call)
            }
            None => Err(AppError::not_found(format!(
                "Service call {id} not found or already handled"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::local::Mem;

    async fn setup() -> (ServiceCallService, Arc<EventBroadcaster>) {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();

        let broadcaster = Arc::new(EventBroadcaster::new());
        (
            ServiceCallService::new(db, broadcaster.clone()),
            broadcaster,
        )
    }

    fn id_of(call: &ServiceCall) -> String {
        call.id.as_ref().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_raises_pending_call() {
        let (service, broadcaster) = setup().await;
        let mut rx = broadcaster.subscribe();

        let call = service.create(7).await.unwrap();
        assert_eq!(call.status, ServiceCallStatus::Pending);
        assert_eq!(call.table_number, 7);
        assert!(call.handled_at.is_none());

        assert_eq!(rx.try_recv().unwrap().event, EventName::ServiceCallCreated);
    }

    #[tokio::test]
    async fn test_create_returns_open_call() {
        let (service, _broadcaster) = setup().await;

        let first = service.create(7).await.unwrap();
        let second = service.create(7).await.unwrap();
        assert_eq!(id_of(&first), id_of(&second));

        assert_eq!(service.find_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_cycle() {
        let (service, broadcaster) = setup().await;
        let call = service.create(3).await.unwrap();
        let id = id_of(&call);

        let mut rx = broadcaster.subscribe();
        let handled = service.handle(&id).await.unwrap();
        assert_eq!(handled.status, ServiceCallStatus::Handled);
        assert!(handled.handled_at.is_some());
        assert_eq!(rx.try_recv().unwrap().event, EventName::ServiceCallHandled);

        // Handling again is NotFound — the conditional update misses
        assert!(matches!(
            service.handle(&id).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        // A handled call no longer blocks a fresh one
        let fresh = service.create(3).await.unwrap();
        assert_ne!(id_of(&fresh), id);
    }

    #[tokio::test]
    async fn test_handle_unknown_id() {
        let (service, _broadcaster) = setup().await;
        assert!(matches!(
            service.handle("service_call:missing").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_zero_table_number_rejected() {
        let (service, _broadcaster) = setup().await;
        assert!(matches!(
            service.create(0).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
