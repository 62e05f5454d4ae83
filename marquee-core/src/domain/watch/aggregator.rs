use std::{fmt, sync::Arc};

use tracing::{debug, info};

use marquee_model::{MovieID, ViewCountMode};

use crate::application::unit_of_work::AppUnitOfWork;
use crate::error::Result;

/// Derives a movie's `view_count` from the completed progress records of its
/// episodes. Always a full recomputation, never an increment.
#[derive(Clone)]
pub struct ViewAggregator {
    unit_of_work: Arc<AppUnitOfWork>,
    mode: ViewCountMode,
}

impl fmt::Debug for ViewAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewAggregator")
            .field("unit_of_work", &self.unit_of_work)
            .field("mode", &self.mode)
            .finish()
    }
}

impl ViewAggregator {
    pub fn new(unit_of_work: Arc<AppUnitOfWork>, mode: ViewCountMode) -> Self {
        Self { unit_of_work, mode }
    }

    pub fn mode(&self) -> ViewCountMode {
        self.mode
    }

    /// Recount completions for `movie_id` and persist the result.
    ///
    /// The recount and the write happen as one step in the progress store, so
    /// overlapping recomputations cannot leave an older count behind. A movie
    /// missing from the catalog yields `0` and nothing is written.
    pub async fn recompute_view_count(&self, movie_id: MovieID) -> Result<u64> {
        let recounted = self
            .unit_of_work
            .watch_progress
            .recount_movie_views(movie_id, self.mode)
            .await?;

        match recounted {
            Some(view_count) => {
                info!(
                    movie_id = %movie_id,
                    view_count,
                    mode = ?self.mode,
                    "Recomputed view count"
                );
                Ok(view_count)
            }
            None => {
                debug!(movie_id = %movie_id, "Skipping view count for unknown movie");
                Ok(0)
            }
        }
    }
}
