pub mod handlers;
pub mod responses;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Top-level message of every 422 validation response.
pub const VALIDATION_MESSAGE: &str = "Los datos proporcionados no son válidos";

/// Message returned for faults whose details must not reach clients.
pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";

/// Error body shared by every failure response.
///
/// ```json
/// { "message": "Producto no encontrado" }
/// ```
///
/// Validation failures also carry the per-field messages:
///
/// ```json
/// {
///   "message": "Los datos proporcionados no son válidos",
///   "errors": { "nombre": ["El nombre ya existe"] }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Field name to its ordered list of human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the messages of a failed `validator` run.
    pub fn extend_from(&mut self, errors: &ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                self.add(field.to_string(), message);
            }
        }
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        fields.extend_from(errors);
        fields
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(FieldErrors::from(&errors))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnprocessableEntity(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::JsonExtractorRejection(JsonRejection::MissingJsonContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::JsonExtractorRejection(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(DbErr::RecordNotFound(_)) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Database(DbErr::ConnectionAcquire(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(errors) => {
                tracing::info!(fields = ?errors, "Validation failed");
                ErrorResponse {
                    message: VALIDATION_MESSAGE.to_string(),
                    errors: Some(errors),
                }
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!("JSON extraction error: {}", e.body_text());
                message_body(format!("Cuerpo JSON inválido: {}", e.body_text()))
            }
            AppError::Database(DbErr::RecordNotFound(msg)) => {
                tracing::info!("Database row not found: {}", msg);
                message_body("Recurso no encontrado")
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                message_body(if status == StatusCode::SERVICE_UNAVAILABLE {
                    "Servicio no disponible"
                } else {
                    INTERNAL_MESSAGE
                })
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                message_body(msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!("Not found: {}", msg);
                message_body(msg)
            }
            AppError::UnprocessableEntity(msg) => {
                tracing::info!("Unprocessable entity: {}", msg);
                message_body(msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                message_body(msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

fn message_body(message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        message: message.into(),
        errors: None,
    }
}

/// Build a `{ "message" }` error response outside of `AppError`.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(message_body(message))).into_response()
}
