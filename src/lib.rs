//! SpeedLimit Decision Service
//!
//! Recommends a highway speed limit from road-weather and air-quality
//! readings.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 SPEEDLIMIT DECISION SERVICE                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /api/v1/decision                                       │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ┌────────────┐   hazard   ┌──────────────┐  ┌────────────┐  │
//! │  │ Controller │──────────▶ │ RiskOptimizer│─▶│ Artifacts  │  │
//! │  │  (router)  │            └──────────────┘  └────────────┘  │
//! │  └─────┬──────┘   safe     ┌──────────────┐  ┌────────────┐  │
//! │        └─────────────────▶ │ PolicyAgent  │─▶│ Completion │  │
//! │                            └──────────────┘  │  provider  │  │
//! │                                              └────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::logic::controller::Controller;
use crate::logic::optimizer::RiskOptimizer;
use crate::logic::policy::{CompletionProvider, PolicyAgent};
use crate::logic::transport::{
    HttpPolicyBackend, HttpRiskBackend, LocalPolicyBackend, LocalRiskBackend, PolicyBackend,
    RiskBackend, TransportError,
};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when the risk artifacts failed to load
    pub optimizer: Option<Arc<RiskOptimizer>>,
    pub policy_agent: PolicyAgent,
    pub controller: Controller,
}

impl AppState {
    /// Wire the controller to in-process or remote collaborators per `config`
    pub fn new(
        config: Config,
        optimizer: Option<Arc<RiskOptimizer>>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, TransportError> {
        let policy_agent = PolicyAgent::new(provider, config.completion_timeout());

        let risk: Arc<dyn RiskBackend> = match &config.risk_service_url {
            Some(url) => Arc::new(HttpRiskBackend::new(url, config.request_timeout())?),
            None => Arc::new(LocalRiskBackend::new(optimizer.clone())),
        };

        let policy: Arc<dyn PolicyBackend> = match &config.policy_service_url {
            Some(url) => Arc::new(HttpPolicyBackend::new(url, config.request_timeout())?),
            None => Arc::new(LocalPolicyBackend::new(policy_agent.clone())),
        };

        Ok(Self {
            config,
            optimizer,
            policy_agent,
            controller: Controller::new(risk, policy),
        })
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/v1/router/check", post(handlers::router::check))
        .route("/api/v1/risk/optimize", post(handlers::risk::optimize))
        .route("/api/v1/risk/status", get(handlers::risk::status))
        .route("/api/v1/policy/reduction", post(handlers::policy::reduction))
        .route("/api/v1/decision", post(handlers::decision::decide));

    Router::new()
        .route("/", get(handlers::health::check))
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
