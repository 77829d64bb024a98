use axum::Router;
use std::sync::Arc;
use domain_catalog::{CatalogService, PgCatalogRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgCatalogRepository::new(Arc::clone(&state.db));
    let service = CatalogService::new(repository);
    handlers::router(service)
}
