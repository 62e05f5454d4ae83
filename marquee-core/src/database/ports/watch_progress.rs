use async_trait::async_trait;
use chrono::{DateTime, Utc};

use marquee_model::{
    EpisodeID, MovieID, ProgressRecord, ProgressTransition, UserID,
    ViewCountMode,
};

use crate::error::Result;

/// A validated, resolved progress report ready to be applied atomically
#[derive(Debug, Clone, Copy)]
pub struct ProgressWrite {
    pub user_id: UserID,
    pub episode_id: EpisodeID,
    pub current_time: f64,
    pub duration: f64,
    pub force_complete: bool,
    pub completion_threshold: f64,
    pub now: DateTime<Utc>,
}

/// A completion check that leaves position and duration untouched
#[derive(Debug, Clone, Copy)]
pub struct CompletionWrite {
    pub user_id: UserID,
    pub episode_id: EpisodeID,
    /// Duration for the record if this call ends up creating it
    pub duration: f64,
    pub force_complete: bool,
    pub completion_threshold: f64,
    pub now: DateTime<Utc>,
}

/// Stored record after a write plus what that write changed
#[derive(Debug, Clone)]
pub struct ProgressOutcome {
    pub record: ProgressRecord,
    pub transition: ProgressTransition,
}

/// Persistence for per-(user, episode) progress records.
///
/// Both write operations are find-or-create plus read-modify-write in one
/// atomic step: implementations must never let two concurrent writers create
/// duplicate rows, lose a forward position, or clear a completion latch.
#[async_trait]
pub trait WatchProgressRepository: Send + Sync {
    async fn apply_report(&self, write: &ProgressWrite) -> Result<ProgressOutcome>;

    async fn apply_completion(
        &self,
        write: &CompletionWrite,
    ) -> Result<ProgressOutcome>;

    async fn get_progress(
        &self,
        user_id: UserID,
        episode_id: EpisodeID,
    ) -> Result<Option<ProgressRecord>>;

    /// Every record of a user, most recently watched first
    async fn list_for_user(&self, user_id: UserID) -> Result<Vec<ProgressRecord>>;

    /// Started but not completed records, most recently watched first
    async fn list_in_progress(
        &self,
        user_id: UserID,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>>;

    /// Recount completed records across a movie's episodes and store the
    /// result as the movie's `view_count`.
    ///
    /// Counting and storing form one atomic step with respect to other
    /// recounts of the same movie, so the stored value is never older than a
    /// count taken by a recount that finished earlier. Returns `None` when the
    /// movie does not exist; nothing is written in that case.
    async fn recount_movie_views(
        &self,
        movie_id: MovieID,
        mode: ViewCountMode,
    ) -> Result<Option<u64>>;
}
