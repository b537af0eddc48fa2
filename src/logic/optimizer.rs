//! Risk Optimizer - highest speed that keeps predicted risk under budget
//!
//! Walks the candidate ladder from 130 down to 60 and stops at the first
//! speed whose predicted near-accident count is below 1.0 per hour.
//! The walk is sequential: "first candidate under budget" depends on order.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, LayoutError};
use crate::logic::model::{ArtifactBundle, ArtifactError, ScoringError};
use crate::logic::sensors::SparseReading;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Candidate speeds, strictly descending (km/h)
pub const CANDIDATE_SPEEDS: [u32; 8] = [130, 120, 110, 100, 90, 80, 70, 60];

/// Speed returned when no candidate meets the budget
pub const RISK_FLOOR_SPEED: u32 = 60;

/// Max predicted near-accidents per hour
pub const SAFETY_BUDGET: f64 = 1.0;

pub fn is_candidate_speed(speed: u32) -> bool {
    CANDIDATE_SPEEDS.contains(&speed)
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyStatus {
    #[serde(rename = "safe")]
    Safe,
    #[serde(rename = "high-risk")]
    HighRisk,
}

impl SafetyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyStatus::Safe => "safe",
            SafetyStatus::HighRisk => "high-risk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SafetyStatus::Safe => "Safe",
            SafetyStatus::HighRisk => "Risk high - lowest limit selected",
        }
    }
}

/// One evaluated ladder rung
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub speed: u32,
    pub predicted_risk: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub speed: u32,
    pub lowest_observed_risk: f64,
    pub status: SafetyStatus,
    /// Rungs in the order they were scored
    pub assessments: Vec<RiskAssessment>,
}

#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("feature layout mismatch: {0}")]
    Layout(#[from] LayoutError),

    #[error("risk scoring failed at {speed} km/h: {source}")]
    Scoring {
        speed: u32,
        #[source]
        source: ScoringError,
    },
}

// ============================================================================
// OPTIMIZER
// ============================================================================

#[derive(Debug, Clone)]
pub struct RiskOptimizer {
    bundle: Arc<ArtifactBundle>,
}

impl RiskOptimizer {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    /// Load artifacts and build the optimizer. Fails if any artifact is
    /// missing or inconsistent.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let bundle = ArtifactBundle::load(dir)?;
        Ok(Self::new(Arc::new(bundle)))
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn optimize(&self, readings: &SparseReading) -> Result<OptimizationOutcome, OptimizerError> {
        let bundle = &self.bundle;
        let layout = bundle.layout();

        let means = readings.reduce();
        let row = FeatureVector::from_sensor_means(layout, &means);
        tracing::debug!(
            "Optimizing from {} readings ({} features missing before imputation)",
            readings.len(),
            row.missing_count()
        );

        let mut imputed = row.impute(layout, bundle.imputer())?;
        let speed_index = layout.speed_index();

        let mut assessments = Vec::with_capacity(CANDIDATE_SPEEDS.len());
        let mut lowest_risk = f64::INFINITY;

        for speed in CANDIDATE_SPEEDS {
            imputed[speed_index] = speed as f64;

            let scaled = bundle.scaler().transform(layout, imputed.view())?;
            let risk = bundle
                .model()
                .predict(scaled.view())
                .map_err(|source| OptimizerError::Scoring { speed, source })?
                .max(0.0);

            lowest_risk = lowest_risk.min(risk);
            assessments.push(RiskAssessment {
                speed,
                predicted_risk: risk,
            });

            if risk < SAFETY_BUDGET {
                tracing::debug!("Accepted {} km/h (risk {:.3})", speed, risk);
                return Ok(OptimizationOutcome {
                    speed,
                    lowest_observed_risk: lowest_risk,
                    status: SafetyStatus::Safe,
                    assessments,
                });
            }
        }

        tracing::warn!(
            "No candidate under budget (lowest risk {:.3}), falling back to {} km/h",
            lowest_risk,
            RISK_FLOOR_SPEED
        );

        Ok(OptimizationOutcome {
            speed: RISK_FLOOR_SPEED,
            lowest_observed_risk: lowest_risk,
            status: SafetyStatus::HighRisk,
            assessments,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
