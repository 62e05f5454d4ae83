use axum::{Router, routing::{get, post}};

use crate::{
    AppState,
    handlers::{view_count_handlers, watch_progress_handlers},
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/watch/progress",
            post(watch_progress_handlers::report_progress_handler),
        )
        .route(
            "/watch/complete",
            post(watch_progress_handlers::mark_complete_handler),
        )
        .route(
            "/watch/progress/{user_id}",
            get(watch_progress_handlers::list_progress_handler),
        )
        .route(
            "/watch/continue/{user_id}",
            get(watch_progress_handlers::continue_watching_handler),
        )
        .route(
            "/movies/{movie_id}/views/recompute",
            post(view_count_handlers::recompute_view_count_handler),
        )
}
