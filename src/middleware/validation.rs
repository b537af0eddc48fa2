//! Validated JSON extractor
//!
//! Deserializes the body like `Json<T>`, then runs `validator` rules.
//! Both kinds of failure become `AppError::ValidationError` (400) before
//! the handler runs.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
            })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
