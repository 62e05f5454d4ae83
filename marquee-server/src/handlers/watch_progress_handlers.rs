use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use marquee_core::api_types::{
    ApiResponse, ContinueWatchingQuery, MarkCompleteRequest,
    ReportProgressRequest,
};
use marquee_model::{ProgressRecord, UserID};

use crate::{AppState, infra::errors::AppResult};

/// Record a playback position
///
/// Players send this every few seconds while playing. `content_id` may be an
/// episode id or the id of a single-unit movie.
///
/// # Request
///
/// ```json
/// {
///   "user_id": "0190f3a0-5c2e-7d4b-9a1f-3c2b1a0e9d8c",
///   "content_id": "0190f3a1-0000-7000-8000-000000000007",
///   "current_time": 1800.0,
///   "duration": 7200.0
/// }
/// ```
///
/// # Response
///
/// - `200 OK` with the stored progress record
/// - `400 Bad Request` for negative or non-finite numbers
/// - `404 Not Found` when the content id matches nothing
/// - `422 Unprocessable Entity` when a series id is used instead of an episode
///
/// # Behavior
///
/// - Positions never move backwards; rewinds are accepted and ignored
/// - At 95% watched (configurable) the record latches as completed
/// - A completion triggers a recount of the movie's views
pub async fn report_progress_handler(
    State(state): State<AppState>,
    Json(request): Json<ReportProgressRequest>,
) -> AppResult<Json<ApiResponse<ProgressRecord>>> {
    let record = state.tracker().report_progress(&request).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// Confirm completion without reporting a new position
///
/// With `force_complete` the record is marked completed unconditionally;
/// otherwise only if its stored position already meets the threshold.
pub async fn mark_complete_handler(
    State(state): State<AppState>,
    Json(request): Json<MarkCompleteRequest>,
) -> AppResult<Json<ApiResponse<ProgressRecord>>> {
    let record = state.tracker().mark_complete_if_eligible(&request).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// All progress records of a user, most recently watched first
pub async fn list_progress_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<ProgressRecord>>>> {
    let records = state.tracker().list_progress(UserID(user_id)).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// Started but unfinished items for the "continue watching" row
pub async fn continue_watching_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ContinueWatchingQuery>,
) -> AppResult<Json<ApiResponse<Vec<ProgressRecord>>>> {
    let records = state
        .tracker()
        .continue_watching(UserID(user_id), query.limit)
        .await?;
    Ok(Json(ApiResponse::success(records)))
}
