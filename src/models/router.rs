//! Router check model

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::logic::router::RouterVerdict as RouterCheckResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RouterCheckRequest {
    #[validate(range(min = 0.0, message = "illuminance must be non-negative"))]
    pub illuminance_lux: f64,

    #[validate(range(min = 0.0, message = "water level must be non-negative"))]
    pub water_level_micrometers: f64,

    pub temperature_celsius: f64,
}
