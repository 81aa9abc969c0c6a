//! JSON body extractor that reports bad input as an [`AppError`].

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::{Validate, ValidationErrors};

use ruzma_core::error::AppError;

/// Deserializes a JSON body and runs its `validator` rules.
///
/// Malformed JSON and failed rules both come back as a `VALIDATION_ERROR`
/// body instead of axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        value.validate().map_err(validation_failed)?;
        Ok(Self(value))
    }
}

fn validation_failed(errors: ValidationErrors) -> AppError {
    let fields: serde_json::Map<String, serde_json::Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();

    AppError::validation("Request validation failed").with_details(serde_json::Value::Object(fields))
}
