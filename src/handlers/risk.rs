//! Risk optimization handlers

use axum::{extract::State, Json};

use crate::middleware::ValidatedJson;
use crate::models::{OptimizeRequest, OptimizeResponse, RiskStatusResponse};
use crate::{AppError, AppResult, AppState};

/// Highest ladder speed under the risk budget
pub async fn optimize(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<OptimizeRequest>,
) -> AppResult<Json<OptimizeResponse>> {
    let optimizer = state.optimizer.as_ref().ok_or(AppError::ArtifactsMissing)?;

    let outcome = optimizer.optimize(&req.readings)?;
    tracing::debug!(
        "Risk optimization: {} readings → {} km/h ({})",
        req.readings.len(),
        outcome.speed,
        outcome.status.as_str()
    );

    Ok(Json(outcome.into()))
}

/// Loaded artifact summary
pub async fn status(State(state): State<AppState>) -> Json<RiskStatusResponse> {
    Json(RiskStatusResponse {
        loaded: state.optimizer.is_some(),
        artifacts: state.optimizer.as_ref().map(|o| o.bundle().status()),
        checked_at: chrono::Utc::now(),
    })
}
