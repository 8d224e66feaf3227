//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use docvault_core::error::AppError;

use crate::error::ApiError;

/// Deserializes the body as JSON, then validates it.
///
/// Failures become `Validation` errors; rule violations carry a
/// `{field: [messages]}` details object.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate().map_err(validation_error)?;
        Ok(ValidatedJson(value))
    }
}

/// Convert `validator` output into a field-keyed `Validation` error.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut details = serde_json::Map::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<serde_json::Value> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"))
                    .into()
            })
            .collect();
        details.insert(field.to_string(), serde_json::Value::Array(messages));
    }
    AppError::validation("Request validation failed").with_details(details.into())
}
