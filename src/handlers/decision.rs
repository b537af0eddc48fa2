//! Top-level decision handler

use axum::{extract::State, Json};

use crate::logic::controller::SensorSnapshot;
use crate::middleware::ValidatedJson;
use crate::models::{DecisionRequest, DecisionResponse};
use crate::{AppResult, AppState};

/// Route the snapshot and return the final speed limit
pub async fn decide(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<DecisionRequest>,
) -> AppResult<Json<DecisionResponse>> {
    let snapshot = SensorSnapshot::from(&req);
    let recommendation = state.controller.decide(&snapshot).await?;
    Ok(Json(recommendation.into()))
}
