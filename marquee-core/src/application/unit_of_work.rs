use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::infrastructure::memory::{
    InMemoryCatalogRepository, InMemoryWatchProgressRepository,
};
use crate::database::ports::{
    catalog::CatalogRepository, watch_progress::WatchProgressRepository,
};
#[cfg(feature = "database")]
use crate::database::postgres::PostgresDatabase;

/// Aggregates the repository ports used by the progress services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub catalog: Arc<dyn CatalogRepository>,
    pub watch_progress: Arc<dyn WatchProgressRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("catalog", &type_name_of_val(self.catalog.as_ref()))
            .field(
                "watch_progress",
                &type_name_of_val(self.watch_progress.as_ref()),
            )
            .finish()
    }
}

impl AppUnitOfWork {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        watch_progress: Arc<dyn WatchProgressRepository>,
    ) -> Self {
        Self {
            catalog,
            watch_progress,
        }
    }

    /// Build a unit of work wired to Postgres-backed repositories.
    #[cfg(feature = "database")]
    pub fn from_postgres(postgres: &PostgresDatabase) -> Self {
        Self {
            catalog: Arc::new(postgres.catalog_repository().clone()),
            watch_progress: Arc::new(postgres.watch_progress_repository().clone()),
        }
    }

    /// Build a unit of work over process-local stores.
    ///
    /// The catalog handle is shared so callers can keep seeding movies after
    /// the unit of work has been handed to services.
    pub fn in_memory(catalog: InMemoryCatalogRepository) -> Self {
        let watch_progress = InMemoryWatchProgressRepository::new(catalog.clone());
        Self {
            catalog: Arc::new(catalog),
            watch_progress: Arc::new(watch_progress),
        }
    }
}
