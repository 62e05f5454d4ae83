//! Process-local adapters.
//!
//! Used by tests and by the server's in-memory dev mode. Every operation runs
//! under a single async mutex, which gives the same atomicity guarantees the
//! PostgreSQL adapters get from row locks and unique constraints.

pub mod catalog;
pub mod watch_progress;

pub use catalog::InMemoryCatalogRepository;
pub use watch_progress::InMemoryWatchProgressRepository;
