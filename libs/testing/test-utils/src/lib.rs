//! Shared test utilities for the catalog crates
//!
//! - `TestDatabase`: PostgreSQL container with the catalog migrations applied (feature: "postgres")
//! - `TestDataBuilder`: deterministic, collision-free test data
//! - `assertions`: custom assertion helpers
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let name = builder.name("producto", "main");
//!     let category_id = db.create_category(&builder.name("categoria", "main")).await;
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Names derive from the test name, so concurrent tests sharing a database
/// never collide on unique columns.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name (recommended).
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `test-{prefix}-{seed}-{suffix}`
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("producto", "main"), "test-producto-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Image reference unique to this builder.
    pub fn image(&self, suffix: &str) -> String {
        format!("https://cdn.example.com/test/{}/{}.png", self.seed, suffix)
    }

    /// Price in `0.00..100.00` derived from the seed.
    pub fn price(&self) -> f64 {
        (self.seed % 10_000) as f64 / 100.0
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that a quantity matches, naming the record in the failure.
    pub fn assert_quantity(actual: i64, expected: i64, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected quantity {}, got {}",
            context, expected, actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.name("producto", "a"), builder2.name("producto", "a"));
        assert_eq!(builder1.price(), builder2.price());
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.name("producto", "a"), builder2.name("producto", "a"));
        assert_ne!(builder1.image("a"), builder2.image("a"));
    }

    #[test]
    fn test_price_is_non_negative_with_two_decimals() {
        let price = TestDataBuilder::from_test_name("price").price();
        assert!((0.0..100.0).contains(&price));
        assert_eq!((price * 100.0).round() / 100.0, price);
    }
}
