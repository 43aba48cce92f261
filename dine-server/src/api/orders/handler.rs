//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate};
use crate::services::OrderService;
use crate::services::orders::{OrderReports, ReportsQuery};
use crate::utils::AppResult;

/// POST /api/orders - 下单 (客人扫码会话)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.create(payload).await?))
}

/// GET /api/orders - 全部订单
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.find_all().await?))
}

/// GET /api/orders/pending - 待出餐队列
pub async fn list_pending(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.find_pending().await?))
}

/// GET /api/orders/served - 已出餐订单
pub async fn list_served(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.find_served().await?))
}

/// GET /api/orders/reports - 营业报表
pub async fn reports(
    State(state): State<ServerState>,
    Query(query): Query<ReportsQuery>,
) -> AppResult<Json<OrderReports>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.reports(query).await?))
}

/// PUT /api/orders/:id/serve - 出餐
pub async fn mark_served(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.mark_served(&id).await?))
}

/// PUT /api/orders/:id/complete - 单笔完成
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.complete(&id).await?))
}

/// PUT /api/orders/:id/cancel - 取消
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let service = OrderService::from_state(&state);
    Ok(Json(service.cancel(&id).await?))
}

/// Reset response
#[derive(Serialize)]
pub struct ResetResponse {
    pub deleted: u64,
    pub message: &'static str,
}

/// POST /api/orders/reset - 清空全部订单 (管理操作)
pub async fn reset_all(State(state): State<ServerState>) -> AppResult<Json<ResetResponse>> {
    let service = OrderService::from_state(&state);
    let deleted = service.reset_all().await?;
    Ok(Json(ResetResponse {
        deleted,
        message: "All orders reset",
    }))
}
