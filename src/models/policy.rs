//! Policy reduction models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::logic::policy::ReductionDecision;

pub const DEFAULT_DESCRIPTION: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReductionRequest {
    pub aqi: u32,

    /// Free-text label for the reading, logged only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 256, message = "description must be at most 256 characters"))]
    pub description: Option<String>,
}

impl ReductionRequest {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReductionResponse {
    pub aqi_received: u32,
    pub reduction_kmh: i64,
    pub reason: String,
    pub recommended_speed_limit: u32,
}

impl ReductionResponse {
    pub fn new(aqi: u32, decision: ReductionDecision) -> Self {
        Self {
            aqi_received: aqi,
            reduction_kmh: i64::from(decision.reduction_kmh),
            recommended_speed_limit: decision.speed_limit(),
            reason: decision.reason,
        }
    }
}
