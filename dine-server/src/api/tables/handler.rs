//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Order, Table};
use crate::services::SessionService;
use crate::utils::AppResult;

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Table>>> {
    let service = SessionService::from_state(&state);
    Ok(Json(service.list_tables().await?))
}

/// POST /api/tables/:number/activate - 开台，生成会话
pub async fn activate(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
) -> AppResult<Json<Table>> {
    let service = SessionService::from_state(&state);
    Ok(Json(service.activate(number).await?))
}

/// POST /api/tables/:number/checkout - 进入结账，聚合已出餐订单
pub async fn start_checkout(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
) -> AppResult<Json<Table>> {
    let service = SessionService::from_state(&state);
    Ok(Json(service.start_checkout(number).await?))
}

/// POST /api/tables/:number/complete-checkout - 结账完成，释放桌台
pub async fn complete_checkout(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
) -> AppResult<Json<Table>> {
    let service = SessionService::from_state(&state);
    Ok(Json(service.complete_checkout(number).await?))
}

/// POST /api/tables/:number/force-reset - 强制重置 (员工纠错)
pub async fn force_reset(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
) -> AppResult<Json<Table>> {
    let service = SessionService::from_state(&state);
    Ok(Json(service.force_reset(number).await?))
}

/// GET /api/tables/:number/orders - 当前会话的未完结订单
pub async fn session_orders(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
) -> AppResult<Json<Vec<Order>>> {
    let service = SessionService::from_state(&state);
    Ok(Json(service.session_orders(number).await?))
}
