pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cards::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cards/render", post(handlers::handle_render))
        .route("/api/v1/cards/paginate", post(handlers::handle_paginate))
        .with_state(state)
}
