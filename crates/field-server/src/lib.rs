pub mod analytics_routes;
pub mod persistence;
pub mod worker;
pub mod ws_routes;

#[cfg(test)]
mod worker_tests;

use axum::Router;
use field_core::{AppConfig, FieldError, MarketDataProvider, ProviderMode, SnapshotStore};
use market_data::{AlpacaDataClient, SimProvider, TimedProvider};
use persistence::SqliteSnapshotStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use worker::FieldWorker;
use ws_routes::FieldBroadcast;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub broadcast: FieldBroadcast,
}

/// Standard JSON envelope for REST responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn build_provider(cfg: &AppConfig) -> anyhow::Result<Arc<dyn MarketDataProvider>> {
    let timeout = Duration::from_secs(cfg.provider.timeout_seconds);
    match cfg.provider.mode {
        ProviderMode::Sim => Ok(Arc::new(TimedProvider::new(SimProvider::new(), timeout))),
        ProviderMode::Rest => {
            let key_id = std::env::var("ALPACA_API_KEY_ID")
                .map_err(|_| anyhow::anyhow!("ALPACA_API_KEY_ID is required in rest mode"))?;
            let secret_key = std::env::var("ALPACA_API_SECRET_KEY")
                .map_err(|_| anyhow::anyhow!("ALPACA_API_SECRET_KEY is required in rest mode"))?;
            let client =
                AlpacaDataClient::new(cfg.provider.base_url.clone(), key_id, secret_key);
            Ok(Arc::new(TimedProvider::new(client, timeout)))
        }
    }
}

/// Load config, start the worker and serve the REST/WS surface.
///
/// Configuration problems abort here, before the scheduler starts.
pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = Arc::new(AppConfig::load()?);
    let provider = build_provider(&cfg)?;

    let store: Option<Arc<dyn SnapshotStore>> = match &cfg.database_url {
        Some(url) => Some(Arc::new(SqliteSnapshotStore::connect(url).await?)),
        None => {
            tracing::info!("no database_url configured, snapshots are broadcast only");
            None
        }
    };

    let broadcast = FieldBroadcast::new();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<FieldError>();
    tokio::spawn(async move {
        while let Some(err) = error_rx.recv().await {
            tracing::error!("pipeline error: {err}");
        }
    });

    let worker = FieldWorker::new(&cfg, provider, store, broadcast.clone(), error_tx);
    tokio::spawn(worker.run());

    let state = AppState {
        cfg: cfg.clone(),
        broadcast,
    };
    let app = Router::new()
        .merge(analytics_routes::analytics_routes())
        .merge(ws_routes::ws_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind).await?;
    tracing::info!("collapse-field server listening on {}", cfg.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
