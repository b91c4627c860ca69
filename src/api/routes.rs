use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::storage::LinkStore;
use crate::telemetry::EventLogger;

use super::handlers::{create_link, AppState};

pub fn create_api_router(store: Arc<dyn LinkStore>, logger: Arc<EventLogger>) -> Router {
    let state = Arc::new(AppState { store, logger });

    Router::new()
        .route("/api/links", post(create_link))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
