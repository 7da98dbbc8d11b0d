//! Shared application state.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::resources::ResourceQueryService;
use crate::store::postgres::{PgLikeStore, PgResourceStore};

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: PgPool,
    resources: ResourceQueryService,
}

impl AppState {
    /// Connect to the database and wire up the query service.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("failed to connect to PostgreSQL")?;

        let resources = ResourceQueryService::new(
            Arc::new(PgResourceStore::new(pool.clone())),
            Arc::new(PgLikeStore::new(pool.clone())),
            config.page_cache_capacity,
            config.max_page_size,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config: config.clone(),
                pool,
                resources,
            }),
        })
    }

    /// The resource query service.
    pub fn resources(&self) -> &ResourceQueryService {
        &self.inner.resources
    }

    /// Application configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Whether the database answers a trivial query.
    pub async fn db_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.inner.pool).await.is_ok()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}
