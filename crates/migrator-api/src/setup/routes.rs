//! Router assembly

use crate::handlers::{events, health};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Event payloads are metadata only; image bytes never travel through here.
const MAX_EVENT_BODY_BYTES: usize = 1024 * 1024;

pub fn setup_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/events/record-change", post(events::record_change))
        .route("/events/object-finalize", post(events::object_finalize))
        .layer(RequestBodyLimitLayer::new(MAX_EVENT_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
