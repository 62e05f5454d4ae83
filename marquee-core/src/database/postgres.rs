use std::fmt;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::database::infrastructure::postgres::{
    PostgresCatalogRepository, PostgresWatchProgressRepository,
};
use crate::error::{MediaError, Result};

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
    pub min_idle: u32,
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
    min_connections: u32,
    catalog: PostgresCatalogRepository,
    watch_progress: PostgresWatchProgressRepository,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(
        connection_string: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections.min(max_connections))
            .acquire_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                MediaError::Internal(format!("Database connection failed: {e}"))
            })?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            max_connections, min_connections
        );

        Ok(Self::with_limits(pool, max_connections, min_connections))
    }

    /// Create a PostgresDatabase from an existing pool (mainly for testing)
    pub fn from_pool(pool: PgPool) -> Self {
        Self::with_limits(pool, 20, 5)
    }

    fn with_limits(pool: PgPool, max_connections: u32, min_connections: u32) -> Self {
        Self {
            catalog: PostgresCatalogRepository::new(pool.clone()),
            watch_progress: PostgresWatchProgressRepository::new(pool.clone()),
            pool,
            max_connections,
            min_connections,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(crate) fn catalog_repository(&self) -> &PostgresCatalogRepository {
        &self.catalog
    }

    pub(crate) fn watch_progress_repository(
        &self,
    ) -> &PostgresWatchProgressRepository {
        &self.watch_progress
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.max_connections,
            min_idle: self.min_connections,
        }
    }

    /// Apply pending migrations.
    pub async fn initialize_schema(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            MediaError::Internal(format!("Migration failed: {e}"))
        })?;

        info!("Database schema is up to date");
        Ok(())
    }
}
