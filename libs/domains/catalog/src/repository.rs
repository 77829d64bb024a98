use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, InventoryRecord, NewProduct, PAGE_SIZE, Page, Product, ProductFilter, ProductView,
    messages,
};

/// Repository trait for catalog persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active products matching `filter`, id ascending, one page of [`PAGE_SIZE`]
    async fn list_active(&self, filter: ProductFilter) -> CatalogResult<Page<ProductView>>;

    /// Insert the product and its inventory record as one unit
    async fn create_with_inventory(&self, input: NewProduct) -> CatalogResult<ProductView>;

    /// Add `delta` to the stored quantity unless the result would be negative
    async fn adjust_inventory(&self, id: i64, delta: i64) -> CatalogResult<InventoryRecord>;

    /// Flip the active flag
    async fn toggle_active(&self, id: i64) -> CatalogResult<Product>;

    /// Exact match over all products, inactive included
    async fn name_exists(&self, name: &str) -> CatalogResult<bool>;

    async fn category_exists(&self, id: i64) -> CatalogResult<bool>;
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    inventory: BTreeMap<i64, InventoryRecord>,
    next_category_id: i64,
    next_product_id: i64,
    next_inventory_id: i64,
}

impl CatalogState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn view(&self, product: &Product) -> ProductView {
        ProductView {
            product: product.clone(),
            category: product
                .category_id
                .and_then(|id| self.categories.get(&id))
                .cloned(),
            inventory: self
                .inventory
                .values()
                .find(|record| record.product_id == product.id)
                .cloned(),
        }
    }
}

/// In-memory implementation of CatalogRepository (for development/testing)
///
/// Writers are serialised by the lock, which gives the same all-or-nothing
/// behaviour as the Postgres transaction.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category and return it.
    pub async fn insert_category(&self, name: &str) -> Category {
        let mut state = self.state.write().await;
        let id = CatalogState::next_id(&mut state.next_category_id);
        let category = Category {
            id,
            name: name.to_string(),
        };
        state.categories.insert(id, category.clone());
        category
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_active(&self, filter: ProductFilter) -> CatalogResult<Page<ProductView>> {
        let state = self.state.read().await;
        let fragment = filter.name_fragment();

        let matching: Vec<&Product> = state
            .products
            .values()
            .filter(|p| p.active)
            .filter(|p| filter.category_id.is_none() || p.category_id == filter.category_id)
            .filter(|p| match &fragment {
                Some(fragment) => p.name.to_lowercase().contains(fragment.as_str()),
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(PAGE_SIZE as usize)
            .map(|p| state.view(p))
            .collect();

        Ok(Page::new(data, total, filter.page, PAGE_SIZE))
    }

    async fn create_with_inventory(&self, input: NewProduct) -> CatalogResult<ProductView> {
        let mut state = self.state.write().await;

        if state.products.values().any(|p| p.name == input.name) {
            return Err(CatalogError::field("nombre", messages::NAME_TAKEN));
        }
        if let Some(category_id) = input.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(CatalogError::field("category_id", messages::CATEGORY_MISSING));
            }
        }

        let now = Utc::now();
        let product_id = CatalogState::next_id(&mut state.next_product_id);
        let inventory_id = CatalogState::next_id(&mut state.next_inventory_id);

        let product = Product {
            id: product_id,
            name: input.name,
            price: input.price,
            image: input.image,
            category_id: input.category_id,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let record = InventoryRecord {
            id: inventory_id,
            product_id,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        };

        state.products.insert(product_id, product.clone());
        state.inventory.insert(inventory_id, record);

        tracing::info!(product_id, inventory_id, "Created product");
        Ok(state.view(&product))
    }

    async fn adjust_inventory(&self, id: i64, delta: i64) -> CatalogResult<InventoryRecord> {
        let mut state = self.state.write().await;
        let record = state
            .inventory
            .get_mut(&id)
            .ok_or(CatalogError::InventoryNotFound(id))?;

        let current = record.quantity;
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| CatalogError::Internal(format!("Inventory {} quantity overflow", id)))?;
        if updated < 0 {
            return Err(CatalogError::NegativeStock { id, current, delta });
        }

        record.quantity = updated;
        record.updated_at = Utc::now();

        tracing::info!(inventory_id = id, delta, quantity = updated, "Adjusted inventory");
        Ok(record.clone())
    }

    async fn toggle_active(&self, id: i64) -> CatalogResult<Product> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;

        product.active = !product.active;
        product.updated_at = Utc::now();

        tracing::info!(product_id = id, active = product.active, "Toggled product");
        Ok(product.clone())
    }

    async fn name_exists(&self, name: &str) -> CatalogResult<bool> {
        let state = self.state.read().await;
        Ok(state.products.values().any(|p| p.name == name))
    }

    async fn category_exists(&self, id: i64) -> CatalogResult<bool> {
        let state = self.state.read().await;
        Ok(state.categories.contains_key(&id))
    }
}
