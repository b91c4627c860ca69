use axum::{routing::get, Router};
use std::sync::Arc;

use crate::storage::LinkStore;
use crate::telemetry::EventLogger;

use super::handlers::{health_check, redirect_slug, RedirectState};

pub fn create_redirect_router(store: Arc<dyn LinkStore>, logger: Arc<EventLogger>) -> Router {
    let state = Arc::new(RedirectState { store, logger });

    Router::new()
        .route("/", get(health_check))
        .route("/{slug}", get(redirect_slug))
        .with_state(state)
}
