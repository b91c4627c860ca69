use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::models::{CreateLinkRequest, Link};
use crate::storage::{LinkStore, StorageError};
use crate::telemetry::EventLogger;

pub struct AppState {
    pub store: Arc<dyn LinkStore>,
    pub logger: Arc<EventLogger>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Generate a random slug
fn generate_slug() -> String {
    use rand::distr::Alphanumeric;
    use rand::Rng;
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

fn valid_slug(slug: &str) -> bool {
    (1..=32).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Create a new short link
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<Link>), (StatusCode, Json<ErrorResponse>)> {
    match url::Url::parse(&payload.url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => return Err(error(StatusCode::BAD_REQUEST, "Invalid URL")),
    }

    let link = match payload.slug {
        Some(slug) => {
            if !valid_slug(&slug) {
                return Err(error(
                    StatusCode::BAD_REQUEST,
                    "Slug must be 1-32 alphanumeric, '-' or '_' characters",
                ));
            }
            match state.store.create(&slug, &payload.url).await {
                Ok(link) => link,
                Err(StorageError::Conflict) => {
                    return Err(error(StatusCode::CONFLICT, "Slug already exists"));
                }
                Err(_) => return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")),
            }
        }
        None => {
            // Random slugs can collide; take a fresh one and retry.
            let mut created = None;
            for _ in 0..3 {
                match state.store.create(&generate_slug(), &payload.url).await {
                    Ok(link) => {
                        created = Some(link);
                        break;
                    }
                    Err(StorageError::Conflict) => continue,
                    Err(_) => {
                        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"));
                    }
                }
            }
            match created {
                Some(link) => link,
                None => {
                    return Err(error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Could not allocate a slug",
                    ));
                }
            }
        }
    };

    // Creation telemetry is fire-and-forget: the response never waits on the
    // sink, and a failed write only leaves a warning.
    let logger = Arc::clone(&state.logger);
    let event_headers = headers.clone();
    let event_link = link.clone();
    tokio::spawn(async move {
        if let Err(err) = logger
            .log_create(&event_headers, Some(addr.ip()), &event_link)
            .await
        {
            warn!(slug = %event_link.slug, error = %err, "failed to record create event");
        }
    });

    Ok((StatusCode::CREATED, Json(link)))
}
