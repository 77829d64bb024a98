use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    routing::{delete, get, patch},
};
use axum_helpers::{
    ApiResponse, AuditEvent, AuditOutcome, IdPath, JsonBody, QueryParams, ValidatedJson,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse, ValidationErrorResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::entity::TAG;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    AdjustInventory, Category, CreateProduct, InventoryRecord, ListQuery, Page, Product,
    ProductView, messages,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, create_product, adjust_inventory, toggle_product),
    components(
        schemas(
            Product,
            Category,
            InventoryRecord,
            ProductView,
            Page<ProductView>,
            CreateProduct,
            AdjustInventory
        ),
        responses(
            BadRequestResponse,
            NotFoundResponse,
            ValidationErrorResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalog and inventory")
    )
)]
pub struct ApiDoc;

/// Create the catalog router with all HTTP endpoints
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", delete(toggle_product))
        .route("/{id}/inventario", patch(adjust_inventory))
        .with_state(shared_service)
}

/// Audit outcome of a mutation: client-side refusals are `Rejected`,
/// storage faults are `Failure`.
fn audit_outcome<T>(result: &CatalogResult<T>) -> AuditOutcome {
    match result {
        Ok(_) => AuditOutcome::Success,
        Err(
            CatalogError::Validation(_)
            | CatalogError::InvalidFilter(_)
            | CatalogError::ProductNotFound(_)
            | CatalogError::InventoryNotFound(_)
            | CatalogError::NegativeStock { .. },
        ) => AuditOutcome::Rejected,
        Err(_) => AuditOutcome::Failure,
    }
}

/// List active products
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListQuery),
    responses(
        (status = 200, description = "Lista de productos", body = ApiResponse<Page<ProductView>>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    QueryParams(query): QueryParams<ListQuery>,
) -> CatalogResult<ApiResponse<Page<ProductView>>> {
    let page = service.list_products(query).await?;
    Ok(ApiResponse::ok(messages::LISTED, page))
}

/// Create a product with its opening stock
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Producto creado con éxito", body = ApiResponse<ProductView>),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    JsonBody(input): JsonBody<CreateProduct>,
) -> CatalogResult<ApiResponse<ProductView>> {
    let result = service.create_product(input).await;

    match &result {
        Ok(view) => AuditEvent::new(
            "product.create",
            Some(format!("product:{}", view.product.id)),
            AuditOutcome::Success,
        )
        .with_request(&headers)
        .with_details(json!({
            "nombre": view.product.name,
            "cantidad": view.inventory.as_ref().map(|i| i.quantity),
            "category_id": view.product.category_id,
        }))
        .log(),
        Err(CatalogError::Validation(errors)) => {
            AuditEvent::new("product.create", None, AuditOutcome::Rejected)
                .with_request(&headers)
                .with_details(errors)
                .log()
        }
        Err(_) => AuditEvent::new("product.create", None, audit_outcome(&result))
            .with_request(&headers)
            .log(),
    }

    Ok(ApiResponse::created(messages::CREATED, result?))
}

/// Add a signed delta to an inventory record
#[utoipa::path(
    patch,
    path = "/{id}/inventario",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Inventory record ID")
    ),
    request_body = AdjustInventory,
    responses(
        (status = 200, description = "Inventario actualizado", body = ApiResponse<InventoryRecord>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn adjust_inventory<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<AdjustInventory>,
) -> CatalogResult<ApiResponse<InventoryRecord>> {
    let delta = input.delta()?;
    let result = service.adjust_inventory(id, delta).await;

    AuditEvent::new(
        "inventory.adjust",
        Some(format!("inventory:{}", id)),
        audit_outcome(&result),
    )
    .with_request(&headers)
    .with_details(json!({
        "delta": delta,
        "cantidad": result.as_ref().ok().map(|r| r.quantity),
    }))
    .log();

    Ok(ApiResponse::ok(messages::INVENTORY_UPDATED, result?))
}

/// Toggle the active flag (soft delete / restore)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Estado del producto actualizado", body = ApiResponse<Product>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn toggle_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> CatalogResult<ApiResponse<Product>> {
    let result = service.toggle_product(id).await;

    AuditEvent::new(
        "product.toggle",
        Some(format!("product:{}", id)),
        audit_outcome(&result),
    )
    .with_request(&headers)
    .with_details(json!({ "activo": result.as_ref().ok().map(|p| p.active) }))
    .log();

    Ok(ApiResponse::ok(messages::STATUS_UPDATED, result?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_audit_outcome_for_toggle_results() {
        let missing: CatalogResult<Product> = Err(CatalogError::ProductNotFound(42));
        assert_eq!(audit_outcome(&missing), AuditOutcome::Rejected);

        let fault: CatalogResult<Product> =
            Err(CatalogError::Database(DbErr::Custom("connection reset".to_string())));
        assert_eq!(audit_outcome(&fault), AuditOutcome::Failure);
    }

    #[test]
    fn test_audit_outcome_for_adjust_and_create() {
        let below_zero: CatalogResult<InventoryRecord> = Err(CatalogError::NegativeStock {
            id: 1,
            current: 5,
            delta: -10,
        });
        assert_eq!(audit_outcome(&below_zero), AuditOutcome::Rejected);

        let missing: CatalogResult<InventoryRecord> = Err(CatalogError::InventoryNotFound(9));
        assert_eq!(audit_outcome(&missing), AuditOutcome::Rejected);

        let create_fault: CatalogResult<ProductView> =
            Err(CatalogError::CreateFailed(DbErr::Custom("disk full".to_string())));
        assert_eq!(audit_outcome(&create_fault), AuditOutcome::Failure);
    }
}
