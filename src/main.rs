//! SpeedLimit Decision Service binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use speedlimit_service::config::Config;
use speedlimit_service::logic::optimizer::RiskOptimizer;
use speedlimit_service::logic::policy::{OpenAiConfig, OpenAiProvider};
use speedlimit_service::logic::sensors::{self, SENSOR_TABLE};
use speedlimit_service::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "speedlimit_service=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("{} starting...", config.service_name);

    sensors::validate_table(SENSOR_TABLE).context("invalid sensor table")?;

    // Risk artifacts; the risk branch stays unavailable if they are missing
    let optimizer = match RiskOptimizer::from_dir(&config.artifact_dir) {
        Ok(optimizer) => Some(Arc::new(optimizer)),
        Err(e) => {
            tracing::error!(
                "Failed to load risk artifacts from {}: {}",
                config.artifact_dir.display(),
                e
            );
            None
        }
    };

    let provider = OpenAiProvider::new(OpenAiConfig {
        base_url: config.completion_base_url.clone(),
        api_key: config.openai_api_key.clone(),
        model: config.completion_model.clone(),
        timeout_seconds: config.completion_timeout_seconds,
    })
    .context("failed to build completion client")?;

    let state = AppState::new(config.clone(), optimizer, Arc::new(provider))
        .context("failed to wire collaborators")?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
