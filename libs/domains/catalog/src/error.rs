use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldErrors};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::messages;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid input: {0:?}")]
    Validation(FieldErrors),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Inventory record not found: {0}")]
    InventoryNotFound(i64),

    #[error("Inventory {id} would go negative: {current} + ({delta})")]
    NegativeStock { id: i64, current: i64, delta: i64 },

    #[error("Failed to create product: {0}")]
    CreateFailed(#[source] DbErr),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Validation failure on a single field.
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        CatalogError::Validation(errors)
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => AppError::Validation(errors),
            CatalogError::InvalidFilter(msg) => AppError::BadRequest(msg),
            CatalogError::ProductNotFound(_) => {
                AppError::NotFound(messages::PRODUCT_NOT_FOUND.to_string())
            }
            CatalogError::InventoryNotFound(_) => {
                AppError::NotFound(messages::INVENTORY_NOT_FOUND.to_string())
            }
            CatalogError::NegativeStock { id, current, delta } => {
                tracing::info!(inventory_id = id, current, delta, "Rejected negative stock");
                AppError::UnprocessableEntity(messages::NEGATIVE_STOCK.to_string())
            }
            CatalogError::CreateFailed(e) => {
                tracing::error!("Product creation rolled back: {:?}", e);
                AppError::InternalServerError(messages::CREATE_FAILED.to_string())
            }
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
