//! Repository traits consumed by the progress-tracking services.

pub mod catalog;
pub mod watch_progress;
