pub mod catalog;
pub mod watch_progress;
