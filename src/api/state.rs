//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::Services;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Application services
    pub services: Services,
    /// Database connection, used by the health check
    pub database: Arc<Database>,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Create application state over the Postgres-backed services.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let cors_origins = config.cors_origins.clone();
        let services = Services::from_connection(database.get_connection(), config);
        Self::new(services, database, cors_origins)
    }

    /// Create application state with manually injected services.
    pub fn new(services: Services, database: Arc<Database>, cors_origins: Vec<String>) -> Self {
        Self {
            services,
            database,
            cors_origins,
        }
    }
}
