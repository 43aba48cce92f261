//! Dining Table API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{number}/activate", post(handler::activate))
        .route("/{number}/checkout", post(handler::start_checkout))
        .route("/{number}/complete-checkout", post(handler::complete_checkout))
        .route("/{number}/force-reset", post(handler::force_reset))
        .route("/{number}/orders", get(handler::session_orders))
}
