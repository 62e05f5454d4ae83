use std::{any::type_name_of_val, fmt, sync::Arc};

use tracing::{debug, info};
use uuid::Uuid;

use marquee_model::{Episode, EpisodeID, EpisodeRef, MovieID, NewEpisode};

use crate::database::ports::catalog::CatalogRepository;
use crate::error::{MediaError, Result};

/// Episode number of the implicit playback unit of a single-unit movie
pub const CANONICAL_EPISODE_NUMBER: i32 = 1;

/// Maps arbitrary content ids onto trackable episodes.
///
/// Episode ids resolve to themselves. A single-unit movie resolves to its
/// canonical episode, which is created on first use. Series must always be
/// addressed through an explicit episode id.
#[derive(Clone)]
pub struct ContentResolver {
    catalog: Arc<dyn CatalogRepository>,
}

impl fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentResolver")
            .field("catalog", &type_name_of_val(self.catalog.as_ref()))
            .finish()
    }
}

impl ContentResolver {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Resolve `content_id` to the episode progress should be recorded on.
    ///
    /// `supplied_duration` wins over the catalog's runtime when present.
    pub async fn resolve(
        &self,
        content_id: Uuid,
        supplied_duration: Option<f64>,
    ) -> Result<EpisodeRef> {
        if let Some(episode) =
            self.catalog.get_episode(EpisodeID(content_id)).await?
        {
            return Ok(Self::episode_ref(&episode, supplied_duration));
        }

        let movie_id = MovieID(content_id);
        let movie = self
            .catalog
            .get_movie(movie_id)
            .await?
            .ok_or(MediaError::ContentNotFound(content_id))?;

        if movie.kind.is_series() {
            return Err(MediaError::InvalidTarget { movie_id });
        }

        let episode = match self
            .catalog
            .find_episode_by_number(movie_id, CANONICAL_EPISODE_NUMBER)
            .await?
        {
            Some(episode) => episode,
            None => match self
                .catalog
                .find_episodes_by_movie(movie_id)
                .await?
                .into_iter()
                .next()
            {
                Some(episode) => {
                    debug!(
                        movie_id = %movie_id,
                        episode_number = episode.episode_number,
                        "Single movie has no episode #1; using lowest-numbered episode"
                    );
                    episode
                }
                None => {
                    let episode = self
                        .catalog
                        .create_episode(NewEpisode {
                            movie_id,
                            episode_number: CANONICAL_EPISODE_NUMBER,
                            duration: movie.duration,
                            media_ref: movie.media_ref.clone(),
                        })
                        .await?;
                    info!(
                        movie_id = %movie_id,
                        episode_id = %episode.id,
                        "Materialized canonical episode"
                    );
                    episode
                }
            },
        };

        Ok(Self::episode_ref(&episode, supplied_duration))
    }

    fn episode_ref(episode: &Episode, supplied_duration: Option<f64>) -> EpisodeRef {
        EpisodeRef {
            episode_id: episode.id,
            movie_id: episode.movie_id,
            duration: supplied_duration.unwrap_or(episode.duration),
        }
    }
}
