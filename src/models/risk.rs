//! Risk optimization models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::logic::model::ArtifactStatus;
use crate::logic::optimizer::{OptimizationOutcome, RiskAssessment, SafetyStatus};
use crate::logic::sensors::SparseReading;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OptimizeRequest {
    /// Sensor id → reading; unknown ids are ignored
    pub readings: SparseReading,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    pub recommended_speed: u32,
    /// Lowest risk seen during the search
    pub predicted_risk: f64,
    pub safety_status: SafetyStatus,
    #[serde(default)]
    pub assessments: Vec<RiskAssessment>,
}

impl From<OptimizationOutcome> for OptimizeResponse {
    fn from(outcome: OptimizationOutcome) -> Self {
        Self {
            recommended_speed: outcome.speed,
            predicted_risk: outcome.lowest_observed_risk,
            safety_status: outcome.status,
            assessments: outcome.assessments,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatusResponse {
    pub loaded: bool,
    #[serde(flatten)]
    pub artifacts: Option<ArtifactStatus>,
    pub checked_at: DateTime<Utc>,
}
