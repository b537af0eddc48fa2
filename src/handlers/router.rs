//! Router check handler

use axum::Json;

use crate::logic::router;
use crate::middleware::ValidatedJson;
use crate::models::{RouterCheckRequest, RouterCheckResponse};
use crate::AppResult;

/// Evaluate the hard safety thresholds
pub async fn check(
    ValidatedJson(req): ValidatedJson<RouterCheckRequest>,
) -> AppResult<Json<RouterCheckResponse>> {
    let verdict = router::decide(
        req.illuminance_lux,
        req.water_level_micrometers,
        req.temperature_celsius,
    );
    Ok(Json(verdict))
}
