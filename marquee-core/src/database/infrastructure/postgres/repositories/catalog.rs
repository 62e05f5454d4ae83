use std::fmt;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use marquee_model::{Episode, EpisodeID, Movie, MovieID, MovieKind, NewEpisode};

use crate::database::ports::catalog::CatalogRepository;
use crate::error::{MediaError, Result};

#[derive(Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_movie(row: &PgRow) -> std::result::Result<Movie, sqlx::Error> {
        Ok(Movie {
            id: MovieID(row.try_get("id")?),
            kind: row.try_get::<MovieKind, _>("kind")?,
            duration: row.try_get("duration_secs")?,
            media_ref: row.try_get("media_ref")?,
            view_count: row.try_get("view_count")?,
        })
    }

    fn map_episode(row: &PgRow) -> std::result::Result<Episode, sqlx::Error> {
        Ok(Episode {
            id: EpisodeID(row.try_get("id")?),
            movie_id: MovieID(row.try_get("movie_id")?),
            episode_number: row.try_get("episode_number")?,
            duration: row.try_get("duration_secs")?,
            media_ref: row.try_get("media_ref")?,
        })
    }
}

impl fmt::Debug for PostgresCatalogRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresCatalogRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn get_episode(&self, id: EpisodeID) -> Result<Option<Episode>> {
        let row = sqlx::query(
            r#"
            SELECT id, movie_id, episode_number, duration_secs, media_ref
            FROM episodes
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| MediaError::Internal(format!("Failed to load episode: {e}")))?;

        row.as_ref()
            .map(Self::map_episode)
            .transpose()
            .map_err(|e| MediaError::Internal(format!("Failed to decode episode: {e}")))
    }

    async fn get_movie(&self, id: MovieID) -> Result<Option<Movie>> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, duration_secs, media_ref, view_count
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| MediaError::Internal(format!("Failed to load movie: {e}")))?;

        row.as_ref()
            .map(Self::map_movie)
            .transpose()
            .map_err(|e| MediaError::Internal(format!("Failed to decode movie: {e}")))
    }

    async fn create_episode(&self, episode: NewEpisode) -> Result<Episode> {
        // The no-op update makes RETURNING yield the surviving row on conflict,
        // so racing creators all observe the same episode id.
        let row = sqlx::query(
            r#"
            INSERT INTO episodes (id, movie_id, episode_number, duration_secs, media_ref)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (movie_id, episode_number)
            DO UPDATE SET episode_number = EXCLUDED.episode_number
            RETURNING id, movie_id, episode_number, duration_secs, media_ref
            "#,
        )
        .bind(EpisodeID::new().to_uuid())
        .bind(episode.movie_id.to_uuid())
        .bind(episode.episode_number)
        .bind(episode.duration.max(0.0))
        .bind(episode.media_ref.as_deref())
        .fetch_one(self.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                MediaError::NotFound(format!("Movie {} not found", episode.movie_id))
            }
            other => MediaError::Internal(format!("Failed to create episode: {other}")),
        })?;

        Self::map_episode(&row)
            .map_err(|e| MediaError::Internal(format!("Failed to decode episode: {e}")))
    }

    async fn find_episode_by_number(
        &self,
        movie_id: MovieID,
        episode_number: i32,
    ) -> Result<Option<Episode>> {
        let row = sqlx::query(
            r#"
            SELECT id, movie_id, episode_number, duration_secs, media_ref
            FROM episodes
            WHERE movie_id = $1 AND episode_number = $2
            "#,
        )
        .bind(movie_id.to_uuid())
        .bind(episode_number)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| MediaError::Internal(format!("Failed to load episode: {e}")))?;

        row.as_ref()
            .map(Self::map_episode)
            .transpose()
            .map_err(|e| MediaError::Internal(format!("Failed to decode episode: {e}")))
    }

    async fn find_episodes_by_movie(
        &self,
        movie_id: MovieID,
    ) -> Result<Vec<Episode>> {
        let rows = sqlx::query(
            r#"
            SELECT id, movie_id, episode_number, duration_secs, media_ref
            FROM episodes
            WHERE movie_id = $1
            ORDER BY episode_number ASC
            "#,
        )
        .bind(movie_id.to_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| MediaError::Internal(format!("Failed to load episodes: {e}")))?;

        rows.iter()
            .map(Self::map_episode)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MediaError::Internal(format!("Failed to decode episode: {e}")))
    }
}
