use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use marquee_model::{Episode, EpisodeID, Movie, MovieID, NewEpisode};

use crate::database::ports::catalog::CatalogRepository;
use crate::error::{MediaError, Result};

#[derive(Debug, Default)]
pub(super) struct CatalogState {
    pub(super) movies: HashMap<MovieID, Movie>,
    pub(super) episodes: HashMap<EpisodeID, Episode>,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogRepository {
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a movie
    pub async fn insert_movie(&self, movie: Movie) {
        let mut guard = self.state.lock().await;
        guard.movies.insert(movie.id, movie);
    }

    /// Insert or replace an episode; the owning movie must already exist
    pub async fn insert_episode(&self, episode: Episode) -> Result<()> {
        let mut guard = self.state.lock().await;
        if !guard.movies.contains_key(&episode.movie_id) {
            return Err(MediaError::NotFound(format!(
                "movie {} for episode {}",
                episode.movie_id, episode.id
            )));
        }
        guard.episodes.insert(episode.id, episode);
        Ok(())
    }

    pub async fn episode_count(&self) -> usize {
        self.state.lock().await.episodes.len()
    }

    /// Raw catalog state for the progress store's view recount
    pub(super) async fn lock_state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().await
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn get_episode(&self, id: EpisodeID) -> Result<Option<Episode>> {
        let guard = self.state.lock().await;
        Ok(guard.episodes.get(&id).cloned())
    }

    async fn get_movie(&self, id: MovieID) -> Result<Option<Movie>> {
        let guard = self.state.lock().await;
        Ok(guard.movies.get(&id).cloned())
    }

    async fn create_episode(&self, episode: NewEpisode) -> Result<Episode> {
        let mut guard = self.state.lock().await;

        if !guard.movies.contains_key(&episode.movie_id) {
            return Err(MediaError::NotFound(format!(
                "movie {}",
                episode.movie_id
            )));
        }

        if let Some(existing) = guard.episodes.values().find(|stored| {
            stored.movie_id == episode.movie_id
                && stored.episode_number == episode.episode_number
        }) {
            return Ok(existing.clone());
        }

        let created = Episode {
            id: EpisodeID::new(),
            movie_id: episode.movie_id,
            episode_number: episode.episode_number,
            duration: episode.duration,
            media_ref: episode.media_ref,
        };
        guard.episodes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_episode_by_number(
        &self,
        movie_id: MovieID,
        episode_number: i32,
    ) -> Result<Option<Episode>> {
        let guard = self.state.lock().await;
        Ok(guard
            .episodes
            .values()
            .find(|episode| {
                episode.movie_id == movie_id
                    && episode.episode_number == episode_number
            })
            .cloned())
    }

    async fn find_episodes_by_movie(
        &self,
        movie_id: MovieID,
    ) -> Result<Vec<Episode>> {
        let guard = self.state.lock().await;
        let mut episodes: Vec<Episode> = guard
            .episodes
            .values()
            .filter(|episode| episode.movie_id == movie_id)
            .cloned()
            .collect();
        episodes.sort_by_key(|episode| episode.episode_number);
        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::MovieKind;

    fn single_movie() -> Movie {
        Movie {
            id: MovieID::new(),
            kind: MovieKind::Single,
            duration: 5400.0,
            media_ref: Some("s3://films/heist.mp4".into()),
            view_count: 0,
        }
    }

    #[tokio::test]
    async fn create_episode_is_idempotent_per_number() {
        let repo = InMemoryCatalogRepository::new();
        let movie = single_movie();
        repo.insert_movie(movie.clone()).await;

        let request = NewEpisode {
            movie_id: movie.id,
            episode_number: 1,
            duration: movie.duration,
            media_ref: movie.media_ref.clone(),
        };
        let first = repo.create_episode(request.clone()).await.unwrap();
        let second = repo.create_episode(request).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.episode_count().await, 1);
    }

    #[tokio::test]
    async fn create_episode_requires_movie() {
        let repo = InMemoryCatalogRepository::new();
        let err = repo
            .create_episode(NewEpisode {
                movie_id: MovieID::new(),
                episode_number: 1,
                duration: 10.0,
                media_ref: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
    }
}
