mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{ArtifactStore, MemoryArtifactStore, PgArtifactStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Launchpod API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize artifact store
    let store: Arc<dyn ArtifactStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            Arc::new(PgArtifactStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; artifacts are kept in memory and lost on restart");
            Arc::new(MemoryArtifactStore::new())
        }
    };

    // Initialize Gemini client
    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_base.clone(),
        config.llm_timeout,
    )
    .context("Failed to build Gemini HTTP client")?;
    info!(
        "Gemini client initialized (model: {}, timeout: {}s)",
        config.gemini_model,
        config.llm_timeout.as_secs()
    );

    let orchestrator = GenerationOrchestrator::new(
        Arc::new(gemini),
        store,
        config.gemini_model.clone(),
        config.llm_timeout,
    );

    // Build app state
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
