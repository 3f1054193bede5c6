use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use ecobot_core::EcoBotService;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::webhook;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: Arc<EcoBotService>,
}

pub(crate) fn router(service: Arc<EcoBotService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/webhook", post(webhook::receive))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

async fn index() -> &'static str {
    "🌱 Recycling bot up and running"
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
