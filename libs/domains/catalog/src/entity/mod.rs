//! Sea-ORM entities for the catalog tables.

pub mod category;
pub mod inventory;
pub mod product;

pub use category::Entity as CategoryEntity;
pub use inventory::Entity as InventoryEntity;
pub use product::Entity as ProductEntity;

/// OpenAPI tag shared by every catalog endpoint.
pub const TAG: &str = "productos";
