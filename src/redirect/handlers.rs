use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    http::header::HeaderMap,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::storage::LinkStore;
use crate::telemetry::EventLogger;

pub struct RedirectState {
    pub store: Arc<dyn LinkStore>,
    pub logger: Arc<EventLogger>,
}

/// Resolve a slug and redirect to its destination
pub async fn redirect_slug(
    State(state): State<Arc<RedirectState>>,
    Path(slug): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state.store.get(&slug).await {
        Ok(Some(link)) => {
            if let Err(err) = state.store.increment_clicks(&slug).await {
                warn!(slug = %slug, error = %err, "failed to increment clicks");
            }

            // Access telemetry runs detached; the redirect never waits on
            // the sink and never fails because of it.
            let logger = Arc::clone(&state.logger);
            let event_headers = headers.clone();
            let event_link = link.clone();
            tokio::spawn(async move {
                if let Err(err) = logger
                    .log_access(&event_headers, Some(addr.ip()), &event_link)
                    .await
                {
                    warn!(slug = %event_link.slug, error = %err, "failed to record access event");
                }
            });

            // 307 so clients re-request on every visit and each access
            // stays observable.
            Redirect::temporary(&link.target_url).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Short link not found").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
