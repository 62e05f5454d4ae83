//! Playback-progress tracking.
//!
//! Content ids are resolved onto episodes by [`ContentResolver`], progress is
//! applied by [`ProgressTracker`], and completions are rolled up into each
//! movie's `view_count` by [`ViewAggregator`].

pub mod aggregator;
pub mod resolver;
pub mod tracker;

pub use aggregator::ViewAggregator;
pub use resolver::ContentResolver;
pub use tracker::{ProgressTracker, TrackerSettings};
