//! Core data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod ids;
pub mod progress;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{Episode, EpisodeRef, Movie, MovieKind, NewEpisode};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{EpisodeID, MovieID, UserID};
pub use progress::{
    DEFAULT_COMPLETION_THRESHOLD, ProgressRecord, ProgressTransition,
    ViewCountMode, watch_percentage,
};
