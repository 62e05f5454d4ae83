use std::{fmt, sync::Arc};

use chrono::Utc;
use tracing::{debug, info, warn};

use marquee_model::{
    DEFAULT_COMPLETION_THRESHOLD, EpisodeRef, MovieID, ProgressRecord, UserID,
    ViewCountMode,
};

use crate::api_types::{MarkCompleteRequest, ReportProgressRequest};
use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::watch_progress::{
    CompletionWrite, ProgressOutcome, ProgressWrite,
};
use crate::domain::watch::{ContentResolver, ViewAggregator};
use crate::error::{MediaError, Result};

/// Default page size of the continue-watching listing
pub const DEFAULT_CONTINUE_WATCHING_LIMIT: usize = 20;

/// Tunables for progress tracking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSettings {
    /// Watch percentage at which a record latches into completed
    pub completion_threshold: f64,
    pub view_count_mode: ViewCountMode,
    pub continue_watching_limit: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            view_count_mode: ViewCountMode::default(),
            continue_watching_limit: DEFAULT_CONTINUE_WATCHING_LIMIT,
        }
    }
}

/// Applies playback reports to progress records.
///
/// Each write goes through the store as one atomic operation. When a write
/// flips a record into the completed state, the owning movie's view count is
/// recomputed; a failure there is logged and never fails the report.
#[derive(Clone)]
pub struct ProgressTracker {
    unit_of_work: Arc<AppUnitOfWork>,
    resolver: ContentResolver,
    aggregator: ViewAggregator,
    settings: TrackerSettings,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("unit_of_work", &self.unit_of_work)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ProgressTracker {
    pub fn new(unit_of_work: Arc<AppUnitOfWork>, settings: TrackerSettings) -> Self {
        Self {
            resolver: ContentResolver::new(Arc::clone(&unit_of_work.catalog)),
            aggregator: ViewAggregator::new(
                Arc::clone(&unit_of_work),
                settings.view_count_mode,
            ),
            unit_of_work,
            settings,
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &ViewAggregator {
        &self.aggregator
    }

    /// Record a playback position for `content_id`.
    pub async fn report_progress(
        &self,
        request: &ReportProgressRequest,
    ) -> Result<ProgressRecord> {
        validate_seconds("current_time", request.current_time)?;
        if let Some(duration) = request.duration {
            validate_seconds("duration", duration)?;
        }

        let target = self
            .resolver
            .resolve(request.content_id, request.duration)
            .await?;

        let write = ProgressWrite {
            user_id: request.user_id,
            episode_id: target.episode_id,
            current_time: request.current_time,
            duration: target.duration.max(0.0),
            force_complete: request.force_complete,
            completion_threshold: self.settings.completion_threshold,
            now: Utc::now(),
        };
        let outcome = self.unit_of_work.watch_progress.apply_report(&write).await?;

        debug!(
            user_id = %request.user_id,
            episode_id = %target.episode_id,
            current_time = outcome.record.current_time,
            watch_percentage = outcome.record.watch_percentage,
            created = outcome.transition.created,
            "Applied progress report"
        );

        self.after_write(&target, outcome).await
    }

    /// Re-check completion for `content_id` without moving the position.
    ///
    /// With `force_complete` the record latches unconditionally; otherwise it
    /// latches only if the stored position already meets the threshold.
    pub async fn mark_complete_if_eligible(
        &self,
        request: &MarkCompleteRequest,
    ) -> Result<ProgressRecord> {
        let target = self.resolver.resolve(request.content_id, None).await?;

        let write = CompletionWrite {
            user_id: request.user_id,
            episode_id: target.episode_id,
            duration: target.duration.max(0.0),
            force_complete: request.force_complete,
            completion_threshold: self.settings.completion_threshold,
            now: Utc::now(),
        };
        let outcome = self
            .unit_of_work
            .watch_progress
            .apply_completion(&write)
            .await?;

        self.after_write(&target, outcome).await
    }

    /// Every progress record of a user, most recently watched first
    pub async fn list_progress(&self, user_id: UserID) -> Result<Vec<ProgressRecord>> {
        self.unit_of_work.watch_progress.list_for_user(user_id).await
    }

    /// Started but unfinished items, most recently watched first
    pub async fn continue_watching(
        &self,
        user_id: UserID,
        limit: Option<usize>,
    ) -> Result<Vec<ProgressRecord>> {
        let limit = limit
            .filter(|limit| *limit > 0)
            .unwrap_or(self.settings.continue_watching_limit);
        self.unit_of_work
            .watch_progress
            .list_in_progress(user_id, limit)
            .await
    }

    async fn after_write(
        &self,
        target: &EpisodeRef,
        outcome: ProgressOutcome,
    ) -> Result<ProgressRecord> {
        if outcome.transition.completed_now {
            info!(
                user_id = %outcome.record.user_id,
                episode_id = %target.episode_id,
                movie_id = %target.movie_id,
                "Progress record completed"
            );
            self.refresh_view_count(target.movie_id).await;
        }

        Ok(outcome.record)
    }

    async fn refresh_view_count(&self, movie_id: MovieID) {
        if let Err(e) = self.aggregator.recompute_view_count(movie_id).await {
            warn!(
                movie_id = %movie_id,
                error = %e,
                "View count recomputation failed; record kept"
            );
        }
    }
}

fn validate_seconds(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(MediaError::InvalidProgress(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(MediaError::InvalidProgress(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_validation_rejects_negative_and_non_finite() {
        assert!(validate_seconds("current_time", 0.0).is_ok());
        assert!(validate_seconds("current_time", 12.5).is_ok());
        assert!(validate_seconds("current_time", -1.0).is_err());
        assert!(validate_seconds("duration", f64::NAN).is_err());
        assert!(validate_seconds("duration", f64::INFINITY).is_err());
    }
}
