use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    entity::{CategoryEntity, InventoryEntity, ProductEntity, category, inventory, product},
    error::{CatalogError, CatalogResult},
    models::{
        Category, InventoryRecord, NewProduct, PAGE_SIZE, Page, Product, ProductFilter,
        ProductView, messages,
    },
    repository::CatalogRepository,
};

pub struct PgCatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl PgCatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Escape LIKE wildcards so the fragment matches literally.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Constraint violations during create are reported like the upfront checks.
fn create_error(err: DbErr) -> CatalogError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            CatalogError::field("nombre", messages::NAME_TAKEN)
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            CatalogError::field("category_id", messages::CATEGORY_MISSING)
        }
        _ => CatalogError::CreateFailed(err),
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_active(&self, filter: ProductFilter) -> CatalogResult<Page<ProductView>> {
        let mut query = ProductEntity::find().filter(product::Column::Active.eq(true));

        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        if let Some(fragment) = filter.name_fragment() {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                    .like(like_pattern(&fragment)),
            );
        }

        // count and page come from one snapshot
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await?;

        let total = query.clone().count(&txn).await?;

        let products = query
            .order_by_asc(product::Column::Id)
            .limit(PAGE_SIZE)
            .offset(filter.offset())
            .all(&txn)
            .await?;

        let category_ids: Vec<i64> = products.iter().filter_map(|p| p.category_id).collect();
        let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();

        let categories: HashMap<i64, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&txn)
                .await?
                .into_iter()
                .map(|c| (c.id, c.into()))
                .collect()
        };

        let mut inventory: HashMap<i64, InventoryRecord> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            InventoryEntity::find()
                .filter(inventory::Column::ProductId.is_in(product_ids))
                .all(&txn)
                .await?
                .into_iter()
                .map(|record| (record.product_id, record.into()))
                .collect()
        };

        txn.commit().await?;

        let data = products
            .into_iter()
            .map(|model| {
                let category = model.category_id.and_then(|id| categories.get(&id).cloned());
                let record = inventory.remove(&model.id);
                ProductView {
                    product: model.into(),
                    category,
                    inventory: record,
                }
            })
            .collect();

        Ok(Page::new(data, total, filter.page, PAGE_SIZE))
    }

    async fn create_with_inventory(&self, input: NewProduct) -> CatalogResult<ProductView> {
        // Dropping the transaction without commit rolls both inserts back
        let txn = self.db.begin().await.map_err(CatalogError::CreateFailed)?;

        let product = product::ActiveModel::from(&input)
            .insert(&txn)
            .await
            .map_err(create_error)?;

        let record = inventory::ActiveModel::opening(product.id, input.quantity)
            .insert(&txn)
            .await
            .map_err(create_error)?;

        let category = match product.category_id {
            Some(id) => CategoryEntity::find_by_id(id)
                .one(&txn)
                .await
                .map_err(CatalogError::CreateFailed)?
                .map(Category::from),
            None => None,
        };

        txn.commit().await.map_err(CatalogError::CreateFailed)?;

        tracing::info!(product_id = product.id, inventory_id = record.id, "Created product");
        Ok(ProductView {
            product: product.into(),
            category,
            inventory: Some(record.into()),
        })
    }

    async fn adjust_inventory(&self, id: i64, delta: i64) -> CatalogResult<InventoryRecord> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        // quantity + delta >= 0  <=>  quantity >= -delta
        let floor = delta.checked_neg().unwrap_or(i64::MAX);

        let txn = self.db.begin().await?;

        let result = InventoryEntity::update_many()
            .col_expr(
                inventory::Column::Quantity,
                Expr::col(inventory::Column::Quantity).add(delta),
            )
            .col_expr(inventory::Column::UpdatedAt, Expr::value(now))
            .filter(inventory::Column::Id.eq(id))
            .filter(inventory::Column::Quantity.gte(floor))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            let current = InventoryEntity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or(CatalogError::InventoryNotFound(id))?;

            return Err(CatalogError::NegativeStock {
                id,
                current: current.quantity,
                delta,
            });
        }

        let record = InventoryEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::InventoryNotFound(id))?;

        txn.commit().await?;

        tracing::info!(inventory_id = id, delta, quantity = record.quantity, "Adjusted inventory");
        Ok(record.into())
    }

    async fn toggle_active(&self, id: i64) -> CatalogResult<Product> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.db.begin().await?;

        let result = ProductEntity::update_many()
            .col_expr(
                product::Column::Active,
                SimpleExpr::from(Expr::col(product::Column::Active)).not(),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(now))
            .filter(product::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(CatalogError::ProductNotFound(id));
        }

        let model = ProductEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        txn.commit().await?;

        tracing::info!(product_id = id, active = model.active, "Toggled product");
        Ok(model.into())
    }

    async fn name_exists(&self, name: &str) -> CatalogResult<bool> {
        let count = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }

    async fn category_exists(&self, id: i64) -> CatalogResult<bool> {
        let count = CategoryEntity::find()
            .filter(category::Column::Id.eq(id))
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn inventory_row(id: i64, quantity: i64) -> inventory::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        inventory::Model {
            id,
            product_id: id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    fn product_row(id: i64, name: &str) -> product::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        product::Model {
            id,
            name: name.to_string(),
            price: 9.99,
            image: "img".to_string(),
            category_id: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])
    }

    fn no_rows() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("wid"), "%wid%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_create_error_passes_other_failures_through() {
        let err = create_error(DbErr::Custom("disk full".into()));
        assert!(matches!(err, CatalogError::CreateFailed(_)));
    }

    #[tokio::test]
    async fn test_adjust_rejected_reports_current_quantity() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([no_rows()])
            .append_query_results([vec![inventory_row(1, 5)]])
            .into_connection();
        let repo = PgCatalogRepository::new(Arc::new(db));

        let err = repo.adjust_inventory(1, -10).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NegativeStock { id: 1, current: 5, delta: -10 }
        ));
    }

    #[tokio::test]
    async fn test_adjust_missing_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([no_rows()])
            .append_query_results([Vec::<inventory::Model>::new()])
            .into_connection();
        let repo = PgCatalogRepository::new(Arc::new(db));

        assert!(matches!(
            repo.adjust_inventory(9, 1).await,
            Err(CatalogError::InventoryNotFound(9))
        ));
    }

    #[tokio::test]
    async fn test_adjust_returns_updated_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![inventory_row(1, 8)]])
            .into_connection();
        let repo = PgCatalogRepository::new(Arc::new(db));

        let record = repo.adjust_inventory(1, 3).await.unwrap();
        assert_eq!(record.quantity, 8);
    }

    #[tokio::test]
    async fn test_list_reads_count_and_rows_in_one_transaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![count_row(2)]])
                .append_query_results([vec![product_row(1, "Alpha"), product_row(2, "Beta")]])
                .append_query_results([vec![inventory_row(1, 4), inventory_row(2, 0)]])
                .into_connection(),
        );
        let repo = PgCatalogRepository::new(Arc::clone(&db));

        let page = repo.list_active(ProductFilter::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1].inventory.as_ref().unwrap().quantity, 0);

        drop(repo);
        let log = Arc::try_unwrap(db)
            .ok()
            .expect("repository released the pool")
            .into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_missing_product() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([no_rows()])
            .into_connection();
        let repo = PgCatalogRepository::new(Arc::new(db));

        assert!(matches!(
            repo.toggle_active(3).await,
            Err(CatalogError::ProductNotFound(3))
        ));
    }
}
