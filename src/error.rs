//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::controller::{ControllerError, Stage};
use crate::logic::optimizer::OptimizerError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    ValidationError(String),

    // Collaborator errors
    #[error("{stage} unavailable: {detail}")]
    ServiceUnavailable { stage: Stage, detail: String },

    #[error("risk artifacts not loaded")]
    ArtifactsMissing,

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable { .. } | AppError::ArtifactsMissing => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::ServiceUnavailable { stage, .. } => Some(*stage),
            AppError::ArtifactsMissing => Some(Stage::RiskModel),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match &self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::ServiceUnavailable { stage, detail } => {
                tracing::error!("{} unavailable: {}", stage, detail);
                format!("{} service unavailable", stage)
            }
            AppError::ArtifactsMissing => "Risk artifacts not loaded".to_string(),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
            "stage": self.stage().map(|s| s.as_str()),
        }));

        (status, body).into_response()
    }
}

impl From<ControllerError> for AppError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Unavailable { stage, source } => AppError::ServiceUnavailable {
                stage,
                detail: source.to_string(),
            },
        }
    }
}

impl From<OptimizerError> for AppError {
    fn from(err: OptimizerError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(format!("Validation failed: {}", err))
    }
}
