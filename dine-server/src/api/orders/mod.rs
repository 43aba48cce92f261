//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/pending", get(handler::list_pending))
        .route("/served", get(handler::list_served))
        .route("/reports", get(handler::reports))
        .route("/reset", post(handler::reset_all))
        .route("/{id}/serve", put(handler::mark_served))
        .route("/{id}/complete", put(handler::complete))
        .route("/{id}/cancel", put(handler::cancel))
}
