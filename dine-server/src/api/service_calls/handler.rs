//! Service Call API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{ServiceCall, ServiceCallCreate};
use crate::services::ServiceCallService;
use crate::utils::AppResult;

/// POST /api/service-calls - 呼叫服务
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceCallCreate>,
) -> AppResult<Json<ServiceCall>> {
    let service = ServiceCallService::from_state(&state);
    Ok(Json(service.create(payload.table_number).await?))
}

/// GET /api/service-calls/pending - 待处理呼叫
pub async fn list_pending(State(state): State<ServerState>) -> AppResult<Json<Vec<ServiceCall>>> {
    let service = ServiceCallService::from_state(&state);
    Ok(Json(service.find_pending().await?))
}

/// PUT /api/service-calls/:id/handle - 处理呼叫
pub async fn handle(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ServiceCall>> {
    let service = ServiceCallService::from_state(&state);
    Ok(Json(service.handle(&id).await?))
}
