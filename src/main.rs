use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use slink::config::{Config, RuntimeEnv};
use slink::storage::{LinkStore, SqliteLinkStore};
use slink::telemetry::{EventLogger, TraceSink};
use slink::{api, redirect};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    info!("Using SQLite storage: {}", config.database.url);
    let store: Arc<dyn LinkStore> = Arc::new(
        SqliteLinkStore::new(&config.database.url, config.database.max_connections).await?,
    );
    store.init().await?;
    info!("Database initialized successfully");

    // Initialize the telemetry pipeline. The sink's storage engine is
    // deployment-specific; the default wiring traces every data point.
    let logger = Arc::new(EventLogger::new(
        Arc::new(TraceSink),
        config.telemetry.clone(),
    ));
    match config.telemetry.environment {
        RuntimeEnv::Production => info!("Telemetry: writing data points to the analytics sink"),
        RuntimeEnv::Development => {
            info!("Telemetry: development mode, tracing events instead of writing")
        }
    }
    if config.telemetry.disable_bot_access_logs {
        info!("Telemetry: bot access logging disabled");
    }

    // Create router: create API + redirect handler on one listener
    let router = api::create_api_router(Arc::clone(&store), Arc::clone(&logger)).merge(
        redirect::create_redirect_router(Arc::clone(&store), Arc::clone(&logger)),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - Create endpoint at http://{}/api/links", addr);
    info!("   - Redirects at http://{}/{{slug}}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
