//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tables`] - 桌台会话接口
//! - [`orders`] - 订单接口
//! - [`service_calls`] - 呼叫服务接口
//! - [`events`] - WebSocket 事件流

pub mod events;
pub mod health;
pub mod orders;
pub mod service_calls;
pub mod tables;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(tables::router())
        .merge(orders::router())
        .merge(service_calls::router())
        .merge(events::router())
        .merge(health::router())
}

/// Build the fully configured application with middleware and state
pub fn build_app(state: &ServerState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Request ID - propagate inbound ids, generate missing ones
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, XRequestId))
        // Request logging - outermost, executed first
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone())
}
