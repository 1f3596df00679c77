//! Shared types used across the codebase

use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::database::{DatabaseError, PgExecutor, QueryExecutor};
use crate::query::QueryAssembler;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<QueryAssembler<'static>>,
    /// `None` when no database is configured; compile-only routes still work.
    pub executor: Option<Arc<dyn QueryExecutor>>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(assembler: QueryAssembler<'static>, executor: Option<Arc<dyn QueryExecutor>>, jwt_secret: &str) -> Self {
        Self {
            assembler: Arc::new(assembler),
            executor,
            jwt_secret: Arc::from(jwt_secret),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let executor: Option<Arc<dyn QueryExecutor>> = match PgExecutor::from_config(&config.database) {
            Ok(executor) => Some(Arc::new(executor)),
            Err(DatabaseError::ConfigMissing(key)) => {
                warn!("{} not set; data routes will answer 503", key);
                None
            }
            Err(e) => {
                warn!("database pool unavailable: {}", e);
                None
            }
        };

        Self::new(QueryAssembler::from_config(config), executor, &config.security.jwt_secret)
    }
}
