//! Decision Controller
//!
//! ```text
//! SensorSnapshot ─▶ router ─┬─ hazard ─▶ RiskBackend   ─▶ optimizer speed
//!                           └─ safe   ─▶ PolicyBackend ─▶ max(30, 80 - r)
//! ```
//!
//! Risk branch is fail-closed: no optimizer reply, no speed.
//! Policy branch is fail-open inside the agent, but an unreachable policy
//! transport still fails the request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::optimizer::OptimizationOutcome;
use crate::logic::policy::ReductionDecision;
use crate::logic::router::{self, RouterVerdict};
use crate::logic::sensors::{
    SparseReading, CANONICAL_LIGHT_SENSOR, CANONICAL_TEMPERATURE_SENSOR, CANONICAL_WATER_SENSOR,
};
use crate::logic::transport::{PolicyBackend, RiskBackend, TransportError};

/// Description sent with controller-originated policy requests
pub const CONTROLLER_DESCRIPTION: &str = "Controller decision";

// ============================================================================
// TYPES
// ============================================================================

/// Which collaborator produced (or failed to produce) the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "risk-model")]
    RiskModel,
    #[serde(rename = "policy-agent")]
    PolicyAgent,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RiskModel => "risk-model",
            Stage::PolicyAgent => "policy-agent",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operator reading of the road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub temperature_celsius: f64,
    pub water_level_micrometers: f64,
    pub illuminance_lux: f64,
    pub aqi: u32,
}

impl SensorSnapshot {
    /// Weather values under the sensor ids the risk model was fitted on.
    /// Every other sensor is left to imputation.
    pub fn canonical_readings(&self) -> SparseReading {
        SparseReading::new()
            .with(CANONICAL_WATER_SENSOR, self.water_level_micrometers)
            .with(CANONICAL_LIGHT_SENSOR, self.illuminance_lux)
            .with(CANONICAL_TEMPERATURE_SENSOR, self.temperature_celsius)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedRecommendation {
    pub decision_id: Uuid,
    pub final_speed_limit: u32,
    pub reason: String,
    pub source: Stage,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error("{stage} unavailable: {source}")]
    Unavailable {
        stage: Stage,
        #[source]
        source: TransportError,
    },
}

impl ControllerError {
    pub fn stage(&self) -> Stage {
        match self {
            ControllerError::Unavailable { stage, .. } => *stage,
        }
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[derive(Clone)]
pub struct Controller {
    risk: Arc<dyn RiskBackend>,
    policy: Arc<dyn PolicyBackend>,
}

impl Controller {
    pub fn new(risk: Arc<dyn RiskBackend>, policy: Arc<dyn PolicyBackend>) -> Self {
        tracing::info!(
            "Controller wired: risk via {}, policy via {}",
            risk.describe(),
            policy.describe()
        );
        Self { risk, policy }
    }

    pub async fn decide(
        &self,
        snapshot: &SensorSnapshot,
    ) -> Result<SpeedRecommendation, ControllerError> {
        let decision_id = Uuid::new_v4();

        let verdict = router::decide(
            snapshot.illuminance_lux,
            snapshot.water_level_micrometers,
            snapshot.temperature_celsius,
        );
        tracing::info!(
            %decision_id,
            requires_risk_model = verdict.requires_risk_model,
            "Router: {}",
            verdict.reason
        );

        let result = if verdict.requires_risk_model {
            self.risk_branch(decision_id, snapshot, &verdict).await
        } else {
            self.policy_branch(decision_id, snapshot).await
        };

        match &result {
            Ok(recommendation) => tracing::info!(
                %decision_id,
                source = recommendation.source.as_str(),
                "Final speed limit: {} km/h",
                recommendation.final_speed_limit
            ),
            Err(e) => tracing::error!(
                %decision_id,
                stage = e.stage().as_str(),
                "Decision failed: {}",
                e
            ),
        }

        result
    }

    async fn risk_branch(
        &self,
        decision_id: Uuid,
        snapshot: &SensorSnapshot,
        verdict: &RouterVerdict,
    ) -> Result<SpeedRecommendation, ControllerError> {
        let readings = snapshot.canonical_readings();

        let outcome: OptimizationOutcome =
            self.risk
                .optimize(&readings)
                .await
                .map_err(|source| ControllerError::Unavailable {
                    stage: Stage::RiskModel,
                    source,
                })?;

        tracing::debug!(
            %decision_id,
            "Risk model: {} km/h, lowest risk {:.3} ({})",
            outcome.speed,
            outcome.lowest_observed_risk,
            outcome.status.as_str()
        );

        Ok(SpeedRecommendation {
            decision_id,
            final_speed_limit: outcome.speed,
            reason: format!(
                "Weather hazard detected ({}). Risk analysis: {}",
                verdict.reason,
                outcome.status.description()
            ),
            source: Stage::RiskModel,
        })
    }

    async fn policy_branch(
        &self,
        decision_id: Uuid,
        snapshot: &SensorSnapshot,
    ) -> Result<SpeedRecommendation, ControllerError> {
        let decision: ReductionDecision = self
            .policy
            .reduction(snapshot.aqi, CONTROLLER_DESCRIPTION)
            .await
            .map_err(|source| ControllerError::Unavailable {
                stage: Stage::PolicyAgent,
                source,
            })?;

        if decision.is_fallback() {
            tracing::warn!(%decision_id, "Policy agent returned its fallback");
        }
        tracing::debug!(
            %decision_id,
            "Policy agent: AQI {} → reduction {} km/h",
            snapshot.aqi,
            decision.reduction_kmh
        );

        Ok(SpeedRecommendation {
            decision_id,
            final_speed_limit: decision.speed_limit(),
            reason: format!("Weather is safe. Air quality adjustment: {}", decision.reason),
            source: Stage::PolicyAgent,
        })
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("risk", &self.risk.describe())
            .field("policy", &self.policy.describe())
            .finish()
    }
}
