//! Top-level decision model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::logic::controller::{SensorSnapshot, SpeedRecommendation, Stage};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub temperature_celsius: f64,

    #[validate(range(min = 0.0, message = "water level must be non-negative"))]
    pub water_level_micrometers: f64,

    #[validate(range(min = 0.0, message = "illuminance must be non-negative"))]
    pub illuminance_lux: f64,

    pub aqi: u32,
}

impl From<&DecisionRequest> for SensorSnapshot {
    fn from(req: &DecisionRequest) -> Self {
        SensorSnapshot {
            temperature_celsius: req.temperature_celsius,
            water_level_micrometers: req.water_level_micrometers,
            illuminance_lux: req.illuminance_lux,
            aqi: req.aqi,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub final_speed_limit: u32,
    pub reason: String,
    pub source_service: Stage,
    pub decision_id: Uuid,
}

impl From<SpeedRecommendation> for DecisionResponse {
    fn from(rec: SpeedRecommendation) -> Self {
        Self {
            final_speed_limit: rec.final_speed_limit,
            reason: rec.reason,
            source_service: rec.source,
            decision_id: rec.decision_id,
        }
    }
}
