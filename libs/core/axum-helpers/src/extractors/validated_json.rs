//! JSON extractors that answer with the shared error envelope.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Json<T>` whose rejection is a 400 `{ "message" }` body.
///
/// Use it when validation needs more than the payload itself (e.g. uniqueness
/// checks against storage) and runs in the service.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}

/// JSON extractor with automatic validation.
///
/// Failed rules become a 422 response keyed by field:
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct AdjustInventory {
///     #[validate(required(message = "La cantidad es requerida"))]
///     cantidad: Option<i64>,
/// }
///
/// async fn adjust(ValidatedJson(body): ValidatedJson<AdjustInventory>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(data) = JsonBody::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
