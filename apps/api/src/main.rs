//! # SmartSales API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Server                                     │
//! │                                                                         │
//! │  Browser / Admin ───► HTTP (8000) ───► Services ───► SQLite            │
//! │                                            │                            │
//! │  Stripe ──webhook──►                       ▼                            │
//! │                                      Stripe REST                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use smartsales_api::transcription::HttpTranscriber;
use smartsales_api::{build_router, ApiConfig, AppState};
use smartsales_db::{Database, DbConfig};
use smartsales_gateway::StripeGateway;

const DEFAULT_LOG_FILTER: &str = "smartsales_api=info,smartsales_db=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_target(true)
        .init();

    info!("Starting SmartSales API server...");

    // Load configuration
    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path.display(),
        currency = %config.payment_currency,
        transcription = config.transcription_url.is_some(),
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path).max_connections(config.db_max_connections))
        .await
        .context("opening database")?;

    let gateway = Arc::new(StripeGateway::new(config.stripe()));
    let mut state = AppState::new(db.clone(), gateway, &config.payment_currency)?;
    if let Some(url) = &config.transcription_url {
        state = state.with_transcriber(Arc::new(HttpTranscriber::new(url, &config.transcription_language)));
    }

    let app = build_router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "SmartSales API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
