//! Numeric id path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Extractor for `i64` ids in the path.
///
/// Non-numeric ids are rejected with 400 instead of axum's plain-text rejection.
///
/// ```ignore
/// async fn toggle(IdPath(id): IdPath) -> String {
///     format!("product {}", id)
/// }
///
/// let app = Router::new().route("/productos/{id}", delete(toggle));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        raw.trim()
            .parse::<i64>()
            .map(IdPath)
            .map_err(|_| AppError::BadRequest(format!("Identificador inválido: {}", raw)))
    }
}
