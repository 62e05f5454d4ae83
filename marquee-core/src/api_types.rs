//! Payloads exchanged with player clients.

use marquee_model::{MovieID, UserID};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard API envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Progress report sent by a player
///
/// Players send one of these every few seconds during playback.
/// `content_id` may name an episode or a single-unit movie; series must be
/// addressed through one of their episodes.
///
/// # Example
///
/// ```json
/// {
///   "user_id": "0190f3a0-5c2e-7d4b-9a1f-3c2b1a0e9d8c",
///   "content_id": "0190f3a1-0000-7000-8000-000000000007",
///   "current_time": 1800.0,
///   "duration": 7200.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProgressRequest {
    pub user_id: UserID,
    pub content_id: Uuid,
    /// Playback position in seconds
    pub current_time: f64,
    /// Length in seconds as known to the player; overrides the catalog value
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub force_complete: bool,
}

/// Completion confirmation without a new position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkCompleteRequest {
    pub user_id: UserID,
    pub content_id: Uuid,
    #[serde(default)]
    pub force_complete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContinueWatchingQuery {
    pub limit: Option<usize>,
}

/// Result of a view-count recomputation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewCountResponse {
    pub movie_id: MovieID,
    pub view_count: u64,
}
