//! # folio-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).

use anyhow::Context;
use folio_api::state::{AppConfig, AppState};
use folio_assistant::{CompletionClient, CompletionConfig, Responder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    tracing::info!(?config, "configuration loaded");
    let port = config.port;

    let metrics_handle = if config.metrics_enabled {
        Some(folio_api::middleware::metrics::install_recorder().context("install metrics recorder")?)
    } else {
        None
    };

    // Optional: absent DATABASE_URL means in-memory only.
    let db_pool = folio_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let responder = match CompletionConfig::from_env() {
        Ok(completion) => {
            let client = CompletionClient::new(completion).map_err(|e| {
                tracing::error!("Failed to create completion client: {e}");
                e
            })?;
            tracing::info!(model = client.model(), "completion backend configured");
            Responder::new(Some(client))
        }
        Err(e) => {
            tracing::warn!("Completion backend not configured: {e}. Assistant will use canned replies.");
            Responder::fallback_only()
        }
    };

    let state = AppState::with_config(config, responder, db_pool);
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let mut app = folio_api::app(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(folio_api::middleware::metrics::router(handle));
    }

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Folio API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
