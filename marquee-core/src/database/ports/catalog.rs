use async_trait::async_trait;

use marquee_model::{Episode, EpisodeID, Movie, MovieID, NewEpisode};

use crate::error::Result;

/// Narrow view of the catalog service.
///
/// Movies and episodes are owned elsewhere; the tracker reads them and lazily
/// creates the canonical episode of single-unit movies. Nothing else is
/// written through this port. The view aggregate is stored by
/// [`WatchProgressRepository::recount_movie_views`](crate::database::ports::watch_progress::WatchProgressRepository::recount_movie_views).
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_episode(&self, id: EpisodeID) -> Result<Option<Episode>>;

    async fn get_movie(&self, id: MovieID) -> Result<Option<Movie>>;

    /// Create an episode, or return the one already stored under the same
    /// `(movie_id, episode_number)`. Concurrent callers observe one episode.
    async fn create_episode(&self, episode: NewEpisode) -> Result<Episode>;

    async fn find_episode_by_number(
        &self,
        movie_id: MovieID,
        episode_number: i32,
    ) -> Result<Option<Episode>>;

    /// All episodes of a movie ordered by episode number
    async fn find_episodes_by_movie(
        &self,
        movie_id: MovieID,
    ) -> Result<Vec<Episode>>;
}
