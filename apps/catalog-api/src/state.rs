//! Shared application state passed to route builders and the readiness check.

use database::postgres::DatabaseConnection;
use std::sync::Arc;

/// Cloned per router; every clone shares one connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: Arc<DatabaseConnection>,
}
