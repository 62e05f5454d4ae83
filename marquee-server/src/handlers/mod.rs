pub mod health;
pub mod view_count_handlers;
pub mod watch_progress_handlers;
