use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use marquee_model::{EpisodeID, MovieID, ProgressRecord, UserID, ViewCountMode};

use super::catalog::InMemoryCatalogRepository;
use crate::database::ports::watch_progress::{
    CompletionWrite, ProgressOutcome, ProgressWrite, WatchProgressRepository,
};
use crate::error::Result;

/// Progress records keyed by (user, episode).
///
/// Holds a handle to the catalog it counts views for. A view recount takes
/// the records lock and then the catalog lock, and keeps both until the new
/// `view_count` is stored.
#[derive(Clone, Debug)]
pub struct InMemoryWatchProgressRepository {
    records: Arc<Mutex<HashMap<(UserID, EpisodeID), ProgressRecord>>>,
    catalog: InMemoryCatalogRepository,
}

impl InMemoryWatchProgressRepository {
    pub fn new(catalog: InMemoryCatalogRepository) -> Self {
        Self {
            records: Arc::default(),
            catalog,
        }
    }

    fn sorted_recent_first(mut records: Vec<ProgressRecord>) -> Vec<ProgressRecord> {
        records.sort_by(|a, b| b.last_watched.cmp(&a.last_watched));
        records
    }
}

#[async_trait]
impl WatchProgressRepository for InMemoryWatchProgressRepository {
    async fn apply_report(&self, write: &ProgressWrite) -> Result<ProgressOutcome> {
        let mut guard = self.records.lock().await;
        let key = (write.user_id, write.episode_id);

        let created = !guard.contains_key(&key);
        let record = guard.entry(key).or_insert_with(|| {
            ProgressRecord::new(
                write.user_id,
                write.episode_id,
                write.duration,
                write.now,
            )
        });

        let mut transition = record.apply_report(
            write.current_time,
            write.duration,
            write.force_complete,
            write.completion_threshold,
            write.now,
        );
        transition.created = created;

        Ok(ProgressOutcome {
            record: record.clone(),
            transition,
        })
    }

    async fn apply_completion(
        &self,
        write: &CompletionWrite,
    ) -> Result<ProgressOutcome> {
        let mut guard = self.records.lock().await;
        let key = (write.user_id, write.episode_id);

        let created = !guard.contains_key(&key);
        let record = guard.entry(key).or_insert_with(|| {
            ProgressRecord::new(
                write.user_id,
                write.episode_id,
                write.duration,
                write.now,
            )
        });

        let mut transition = record.apply_completion(
            write.force_complete,
            write.completion_threshold,
            write.now,
        );
        transition.created = created;

        Ok(ProgressOutcome {
            record: record.clone(),
            transition,
        })
    }

    async fn get_progress(
        &self,
        user_id: UserID,
        episode_id: EpisodeID,
    ) -> Result<Option<ProgressRecord>> {
        let guard = self.records.lock().await;
        Ok(guard.get(&(user_id, episode_id)).cloned())
    }

    async fn list_for_user(&self, user_id: UserID) -> Result<Vec<ProgressRecord>> {
        let guard = self.records.lock().await;
        let records = guard
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        Ok(Self::sorted_recent_first(records))
    }

    async fn list_in_progress(
        &self,
        user_id: UserID,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>> {
        let guard = self.records.lock().await;
        let records = guard
            .values()
            .filter(|record| {
                record.user_id == user_id
                    && !record.completed
                    && record.current_time > 0.0
            })
            .cloned()
            .collect();
        let mut records = Self::sorted_recent_first(records);
        records.truncate(limit);
        Ok(records)
    }

    async fn recount_movie_views(
        &self,
        movie_id: MovieID,
        mode: ViewCountMode,
    ) -> Result<Option<u64>> {
        let records = self.records.lock().await;
        let mut catalog = self.catalog.lock_state().await;

        if !catalog.movies.contains_key(&movie_id) {
            return Ok(None);
        }

        let episode_ids: HashSet<EpisodeID> = catalog
            .episodes
            .values()
            .filter(|episode| episode.movie_id == movie_id)
            .map(|episode| episode.id)
            .collect();
        let completed = records.values().filter(|record| {
            record.completed && episode_ids.contains(&record.episode_id)
        });

        let count = match mode {
            ViewCountMode::CompletedRecords => completed.count(),
            ViewCountMode::DistinctViewers => completed
                .map(|record| record.user_id)
                .collect::<HashSet<_>>()
                .len(),
        };
        let count = count as u64;

        if let Some(movie) = catalog.movies.get_mut(&movie_id) {
            movie.view_count = i64::try_from(count).unwrap_or(i64::MAX);
        }
        Ok(Some(count))
    }
}
