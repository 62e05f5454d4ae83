//! Per-(user, episode) playback progress and its update rules.
//!
//! A [`ProgressRecord`] moves through two states: *active* while
//! `completed == false`, and *completed* once the watch percentage reaches the
//! completion threshold or a caller forces it. Completed is terminal; no
//! progress report ever clears the latch.
//!
//! The rules here are the reference semantics for every storage backend. The
//! Postgres adapter evaluates the same expressions inside a single upsert
//! statement so that concurrent reports cannot interleave.

use chrono::{DateTime, Utc};

use crate::ids::{EpisodeID, UserID};

/// Percentage at which a record latches into the completed state
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 95.0;

/// Derive the watch percentage for a position/duration pair.
///
/// Returns `min(100, current_time / duration * 100)` for a positive duration
/// and `0` otherwise, so a zero-length episode never divides by zero.
pub fn watch_percentage(current_time: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        (current_time * 100.0 / duration).min(100.0)
    } else {
        0.0
    }
}

/// How the view aggregate counts completions for a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ViewCountMode {
    /// Every completed (user, episode) record counts once
    #[default]
    CompletedRecords,
    /// Each user counts once per movie regardless of how many episodes they finished
    DistinctViewers,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressRecord {
    pub user_id: UserID,
    pub episode_id: EpisodeID,
    /// Furthest position reported, in seconds
    pub current_time: f64,
    /// Length in seconds used as the percentage denominator
    pub duration: f64,
    pub watch_percentage: f64,
    pub completed: bool,
    /// Number of strictly-forward progress reports
    pub watch_count: i64,
    pub last_watched: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What a single write did to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressTransition {
    /// The record did not exist before this write
    pub created: bool,
    /// This write flipped `completed` from false to true
    pub completed_now: bool,
}

impl ProgressRecord {
    /// Fresh record as produced by the find-or-create step
    pub fn new(
        user_id: UserID,
        episode_id: EpisodeID,
        duration: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            episode_id,
            current_time: 0.0,
            duration,
            watch_percentage: 0.0,
            completed: false,
            watch_count: 0,
            last_watched: now,
            completed_at: None,
            created_at: now,
        }
    }

    /// Apply a reported playback position.
    ///
    /// Only a position strictly past the stored one advances `current_time`
    /// and `watch_count`; rewinds and repeats are accepted but leave both
    /// untouched. The duration is always refreshed to the resolved value.
    pub fn apply_report(
        &mut self,
        current_time: f64,
        duration: f64,
        force_complete: bool,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> ProgressTransition {
        if self.duration != duration {
            self.duration = duration;
        }

        if current_time > self.current_time {
            self.current_time = current_time;
            self.watch_count += 1;
        }

        self.watch_percentage = watch_percentage(self.current_time, self.duration);
        let completed_now = self.latch(force_complete, threshold, now);
        self.last_watched = now;

        ProgressTransition {
            completed_now,
            ..ProgressTransition::default()
        }
    }

    /// Re-evaluate completion without touching position or duration.
    pub fn apply_completion(
        &mut self,
        force_complete: bool,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> ProgressTransition {
        let completed_now = self.latch(force_complete, threshold, now);
        self.last_watched = now;

        ProgressTransition {
            completed_now,
            ..ProgressTransition::default()
        }
    }

    fn latch(
        &mut self,
        force_complete: bool,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> bool {
        let was_completed = self.completed;
        let eligible = watch_percentage(self.current_time, self.duration) >= threshold;
        self.completed = was_completed || force_complete || eligible;

        if self.completed && !was_completed {
            self.completed_at = Some(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration: f64) -> ProgressRecord {
        ProgressRecord::new(UserID::new(), EpisodeID::new(), duration, Utc::now())
    }

    #[test]
    fn percentage_is_clamped_and_safe_for_zero_duration() {
        assert_eq!(watch_percentage(10.0, 100.0), 10.0);
        assert_eq!(watch_percentage(96.0, 100.0), 96.0);
        assert_eq!(watch_percentage(250.0, 100.0), 100.0);
        assert_eq!(watch_percentage(42.0, 0.0), 0.0);
    }

    #[test]
    fn forward_report_advances_and_counts() {
        let mut rec = record(100.0);
        let t = rec.apply_report(10.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        assert!(!t.completed_now);
        assert_eq!(rec.current_time, 10.0);
        assert_eq!(rec.watch_percentage, 10.0);
        assert_eq!(rec.watch_count, 1);
        assert!(!rec.completed);
    }

    #[test]
    fn repeated_and_backward_reports_are_no_ops_for_progress() {
        let mut rec = record(100.0);
        rec.apply_report(40.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        rec.apply_report(40.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());
        rec.apply_report(5.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        assert_eq!(rec.current_time, 40.0);
        assert_eq!(rec.watch_count, 1);
    }

    #[test]
    fn completion_latches_once() {
        let mut rec = record(100.0);
        let first = rec.apply_report(96.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());
        assert!(first.completed_now);
        assert!(rec.completed_at.is_some());

        let again = rec.apply_report(99.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());
        assert!(!again.completed_now);
        assert!(rec.completed);
    }

    #[test]
    fn rewind_never_clears_completion() {
        let mut rec = record(100.0);
        rec.apply_report(97.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());
        for pos in [50.0, 10.0, 0.0] {
            rec.apply_report(pos, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());
            assert!(rec.completed);
        }
    }

    #[test]
    fn duration_growth_does_not_clear_completion() {
        let mut rec = record(100.0);
        rec.apply_report(96.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        rec.apply_report(96.0, 200.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        assert_eq!(rec.duration, 200.0);
        assert_eq!(rec.watch_percentage, 48.0);
        assert!(rec.completed);
    }

    #[test]
    fn forced_completion_without_progress() {
        let mut rec = record(100.0);
        let t = rec.apply_completion(true, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        assert!(t.completed_now);
        assert_eq!(rec.current_time, 0.0);
        assert_eq!(rec.watch_count, 0);
    }

    #[test]
    fn eligibility_check_uses_stored_position() {
        let mut rec = record(100.0);
        rec.apply_report(50.0, 100.0, false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());

        let t = rec.apply_completion(false, DEFAULT_COMPLETION_THRESHOLD, Utc::now());
        assert!(!t.completed_now);
        assert!(!rec.completed);

        let t = rec.apply_completion(false, 50.0, Utc::now());
        assert!(t.completed_now);
    }
}
