use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use marquee_core::api_types::{ApiResponse, ViewCountResponse};
use marquee_model::MovieID;

use crate::{AppState, infra::errors::AppResult};

/// Recount a movie's views from its completed progress records.
///
/// Safe to call at any time; the count is always rebuilt from scratch. Used to
/// repair an aggregate whose automatic refresh failed.
pub async fn recompute_view_count_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ViewCountResponse>>> {
    let movie_id = MovieID(movie_id);
    let aggregator = state.tracker().aggregator();
    let view_count = aggregator.recompute_view_count(movie_id).await?;

    info!(
        movie_id = %movie_id,
        view_count,
        mode = ?aggregator.mode(),
        "view count recomputed on request"
    );
    Ok(Json(
        ApiResponse::success(ViewCountResponse {
            movie_id,
            view_count,
        })
        .with_message(format!("{view_count} views")),
    ))
}
