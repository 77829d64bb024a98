use axum_helpers::FieldErrors;
use std::sync::Arc;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CreateProduct, InventoryRecord, ListQuery, NewProduct, Page, Product, ProductView, messages,
};
use crate::repository::CatalogRepository;

/// Service layer for catalog business logic
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Active products, one page at a time
    pub async fn list_products(&self, query: ListQuery) -> CatalogResult<Page<ProductView>> {
        let filter = query.into_filter()?;
        self.repository.list_active(filter).await
    }

    /// Validate every field, then insert the product together with its stock.
    ///
    /// All failed rules are reported at once; nothing is written unless every
    /// rule passes.
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<ProductView> {
        let mut errors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(&e),
        };

        if !errors.contains("nombre") {
            if let Some(name) = input.nombre.as_deref().map(str::trim) {
                if self.repository.name_exists(name).await? {
                    errors.add("nombre", messages::NAME_TAKEN);
                }
            }
        }

        if let Some(category_id) = input.category_id {
            if !self.repository.category_exists(category_id).await? {
                errors.add("category_id", messages::CATEGORY_MISSING);
            }
        }

        errors.into_result().map_err(CatalogError::Validation)?;

        let new_product = NewProduct::try_from(input).map_err(CatalogError::Validation)?;

        self.repository
            .create_with_inventory(new_product)
            .await
            .map_err(|e| match e {
                CatalogError::Database(db) => CatalogError::CreateFailed(db),
                other => other,
            })
    }

    /// Apply a signed delta; the quantity never drops below zero
    pub async fn adjust_inventory(&self, id: i64, delta: i64) -> CatalogResult<InventoryRecord> {
        self.repository.adjust_inventory(id, delta).await
    }

    /// Soft delete or restore
    pub async fn toggle_product(&self, id: i64) -> CatalogResult<Product> {
        self.repository.toggle_active(id).await
    }
}
