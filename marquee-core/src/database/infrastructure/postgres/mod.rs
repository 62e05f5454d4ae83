pub mod repositories;

pub use repositories::catalog::PostgresCatalogRepository;
pub use repositories::watch_progress::PostgresWatchProgressRepository;
