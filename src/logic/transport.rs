//! Collaborator Transport
//!
//! How the controller reaches the risk optimizer and the policy agent:
//! in-process (`Local*`) or over HTTP to another instance (`Http*`).
//! Either way the reply is checked before the controller sees it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::logic::optimizer::{is_candidate_speed, OptimizationOutcome, RiskOptimizer};
use crate::logic::policy::{PolicyAgent, ReductionDecision};
use crate::logic::sensors::SparseReading;
use crate::models::policy::{ReductionRequest, ReductionResponse};
use crate::models::risk::{OptimizeRequest, OptimizeResponse};

pub const RISK_OPTIMIZE_PATH: &str = "/api/v1/risk/optimize";
pub const POLICY_REDUCTION_PATH: &str = "/api/v1/policy/reduction";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("collaborator returned status {0}")]
    Server(u16),

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("collaborator not ready: {0}")]
    NotReady(String),

    #[error("collaborator failed: {0}")]
    Failed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

// ============================================================================
// BACKEND TRAITS
// ============================================================================

#[async_trait]
pub trait RiskBackend: Send + Sync {
    async fn optimize(&self, readings: &SparseReading) -> Result<OptimizationOutcome, TransportError>;

    fn describe(&self) -> String;
}

#[async_trait]
pub trait PolicyBackend: Send + Sync {
    async fn reduction(&self, aqi: u32, description: &str)
        -> Result<ReductionDecision, TransportError>;

    fn describe(&self) -> String;
}

// ============================================================================
// IN-PROCESS
// ============================================================================

/// Optimizer in this process; `None` when artifacts failed to load
#[derive(Debug, Clone)]
pub struct LocalRiskBackend {
    optimizer: Option<Arc<RiskOptimizer>>,
}

impl LocalRiskBackend {
    pub fn new(optimizer: Option<Arc<RiskOptimizer>>) -> Self {
        Self { optimizer }
    }
}

#[async_trait]
impl RiskBackend for LocalRiskBackend {
    async fn optimize(&self, readings: &SparseReading) -> Result<OptimizationOutcome, TransportError> {
        let optimizer = self
            .optimizer
            .as_ref()
            .ok_or_else(|| TransportError::NotReady("risk artifacts not loaded".to_string()))?;

        optimizer
            .optimize(readings)
            .map_err(|e| TransportError::Failed(e.to_string()))
    }

    fn describe(&self) -> String {
        "in-process".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct LocalPolicyBackend {
    agent: PolicyAgent,
}

impl LocalPolicyBackend {
    pub fn new(agent: PolicyAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl PolicyBackend for LocalPolicyBackend {
    async fn reduction(
        &self,
        aqi: u32,
        description: &str,
    ) -> Result<ReductionDecision, TransportError> {
        tracing::debug!("Policy request: AQI {} ({})", aqi, description);
        Ok(self.agent.recommend_reduction(aqi).await)
    }

    fn describe(&self) -> String {
        format!("in-process ({})", self.agent.provider_name())
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// JSON POST client shared by the remote backends
#[derive(Debug, Clone)]
struct JsonClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl JsonClient {
    fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, TransportError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http_client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Server(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct HttpRiskBackend {
    client: JsonClient,
}

impl HttpRiskBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: JsonClient::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl RiskBackend for HttpRiskBackend {
    async fn optimize(&self, readings: &SparseReading) -> Result<OptimizationOutcome, TransportError> {
        let request = OptimizeRequest {
            readings: readings.clone(),
        };
        let reply: OptimizeResponse = self.client.post(RISK_OPTIMIZE_PATH, &request).await?;

        if !is_candidate_speed(reply.recommended_speed) {
            return Err(TransportError::Malformed(format!(
                "speed {} is not on the ladder",
                reply.recommended_speed
            )));
        }
        if !reply.predicted_risk.is_finite() || reply.predicted_risk < 0.0 {
            return Err(TransportError::Malformed(format!(
                "invalid predicted risk {}",
                reply.predicted_risk
            )));
        }

        Ok(OptimizationOutcome {
            speed: reply.recommended_speed,
            lowest_observed_risk: reply.predicted_risk,
            status: reply.safety_status,
            assessments: reply.assessments,
        })
    }

    fn describe(&self) -> String {
        format!("http ({})", self.client.base_url)
    }
}

#[derive(Debug, Clone)]
pub struct HttpPolicyBackend {
    client: JsonClient,
}

impl HttpPolicyBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: JsonClient::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl PolicyBackend for HttpPolicyBackend {
    async fn reduction(
        &self,
        aqi: u32,
        description: &str,
    ) -> Result<ReductionDecision, TransportError> {
        let request = ReductionRequest {
            aqi,
            description: Some(description.to_string()),
        };
        let reply: ReductionResponse = self.client.post(POLICY_REDUCTION_PATH, &request).await?;

        let reduction_kmh = u32::try_from(reply.reduction_kmh).map_err(|_| {
            TransportError::Malformed(format!("invalid reduction {}", reply.reduction_kmh))
        })?;

        Ok(ReductionDecision {
            reduction_kmh,
            reason: reply.reason,
        })
    }

    fn describe(&self) -> String {
        format!("http ({})", self.client.base_url)
    }
}

// ============================================================================
// TESTS
// ============================================================================
