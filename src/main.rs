mod config;
mod error;
mod forecast;
mod health;
mod openapi;
mod routes;

use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::forecast::{ForecastService, ForecastServiceConfig};

/// Shared HTTP client configuration
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

#[derive(Clone)]
pub struct AppState {
    pub forecast_service: Arc<ForecastService>,
    pub config: Arc<AppConfig>,
}

/// Create shared HTTP client with connection pooling
///
/// No overall timeout unless the operator sets one; a slow model call is
/// awaited to completion.
fn create_http_client(timeout_secs: Option<u64>) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10);

    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for ctrl+c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!(
        model = %config.gemini_model,
        location = %config.location,
        "Configuration loaded successfully"
    );

    let http_client = create_http_client(config.upstream_timeout_secs)?;
    tracing::debug!(timeout_secs = ?config.upstream_timeout_secs, "Shared HTTP client created");

    let forecast_service = Arc::new(ForecastService::from_config(ForecastServiceConfig {
        client: http_client,
        api_key: config.api_key(),
        base_url: &config.gemini_base_url,
        model: &config.gemini_model,
        location: &config.location,
    }));

    if forecast_service.is_configured() {
        tracing::info!("Gemini API key configured");
    } else {
        tracing::warn!("Gemini API key not configured; forecast requests will fail with 500");
    }

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        forecast_service,
        config: Arc::new(config),
    };

    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
