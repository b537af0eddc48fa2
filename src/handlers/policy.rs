//! Policy reduction handler

use axum::{extract::State, Json};

use crate::middleware::ValidatedJson;
use crate::models::{ReductionRequest, ReductionResponse};
use crate::{AppResult, AppState};

/// Air-quality reduction off the baseline. Never fails past validation:
/// provider problems come back as the fallback decision.
pub async fn reduction(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ReductionRequest>,
) -> AppResult<Json<ReductionResponse>> {
    tracing::info!("Policy request: AQI {} ({})", req.aqi, req.description());

    let decision = state.policy_agent.recommend_reduction(req.aqi).await;

    Ok(Json(ReductionResponse::new(req.aqi, decision)))
}
