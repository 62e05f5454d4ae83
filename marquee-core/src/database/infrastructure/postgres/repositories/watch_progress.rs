use std::fmt;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use marquee_model::{
    EpisodeID, MovieID, ProgressRecord, ProgressTransition, UserID,
    ViewCountMode,
};

use crate::database::ports::watch_progress::{
    CompletionWrite, ProgressOutcome, ProgressWrite, WatchProgressRepository,
};
use crate::error::{MediaError, Result};

const RECORD_COLUMNS: &str = "user_id, episode_id, current_time_secs, duration_secs, \
     watch_percentage, completed, watch_count, last_watched, completed_at, created_at";

/// Progress store backed by the `watch_progress` table.
///
/// Every progress write is a single `INSERT .. ON CONFLICT DO UPDATE` statement. The
/// row lock taken by the upsert serializes concurrent writers for the same
/// (user, episode) pair, and the `SET` expressions read the pre-update row,
/// which is what keeps positions monotonic and the completion latch one-way.
#[derive(Clone)]
pub struct PostgresWatchProgressRepository {
    pool: PgPool,
}

impl PostgresWatchProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_record(row: &PgRow) -> std::result::Result<ProgressRecord, sqlx::Error> {
        Ok(ProgressRecord {
            user_id: UserID(row.try_get("user_id")?),
            episode_id: EpisodeID(row.try_get("episode_id")?),
            current_time: row.try_get("current_time_secs")?,
            duration: row.try_get("duration_secs")?,
            watch_percentage: row.try_get("watch_percentage")?,
            completed: row.try_get("completed")?,
            watch_count: row.try_get("watch_count")?,
            last_watched: row.try_get("last_watched")?,
            completed_at: row.try_get("completed_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn map_outcome(row: &PgRow) -> Result<ProgressOutcome> {
        let decode = || -> std::result::Result<ProgressOutcome, sqlx::Error> {
            Ok(ProgressOutcome {
                record: Self::map_record(row)?,
                transition: ProgressTransition {
                    created: row.try_get("inserted")?,
                    completed_now: row.try_get("completed_now")?,
                },
            })
        };
        decode().map_err(|e| {
            MediaError::Internal(format!("Failed to decode watch progress: {e}"))
        })
    }

    fn map_records(rows: &[PgRow]) -> Result<Vec<ProgressRecord>> {
        rows.iter()
            .map(Self::map_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                MediaError::Internal(format!("Failed to decode watch progress: {e}"))
            })
    }
}

impl fmt::Debug for PostgresWatchProgressRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresWatchProgressRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl WatchProgressRepository for PostgresWatchProgressRepository {
    async fn apply_report(&self, write: &ProgressWrite) -> Result<ProgressOutcome> {
        let sql = format!(
            r#"
            INSERT INTO watch_progress AS wp (
                user_id, episode_id, current_time_secs, duration_secs,
                watch_percentage, completed, watch_count,
                last_watched, completed_at, created_at
            )
            VALUES (
                $1, $2, $3, $4,
                progress_percentage($3, $4),
                $5 OR progress_percentage($3, $4) >= $6,
                CASE WHEN $3 > 0 THEN 1 ELSE 0 END,
                $7,
                CASE WHEN $5 OR progress_percentage($3, $4) >= $6 THEN $7 ELSE NULL END,
                $7
            )
            ON CONFLICT (user_id, episode_id) DO UPDATE SET
                duration_secs = EXCLUDED.duration_secs,
                current_time_secs = GREATEST(wp.current_time_secs, EXCLUDED.current_time_secs),
                watch_count = wp.watch_count
                    + CASE WHEN EXCLUDED.current_time_secs > wp.current_time_secs THEN 1 ELSE 0 END,
                watch_percentage = progress_percentage(
                    GREATEST(wp.current_time_secs, EXCLUDED.current_time_secs),
                    EXCLUDED.duration_secs
                ),
                completed = wp.completed OR $5 OR progress_percentage(
                    GREATEST(wp.current_time_secs, EXCLUDED.current_time_secs),
                    EXCLUDED.duration_secs
                ) >= $6,
                completed_at = CASE
                    WHEN wp.completed THEN wp.completed_at
                    WHEN $5 OR progress_percentage(
                        GREATEST(wp.current_time_secs, EXCLUDED.current_time_secs),
                        EXCLUDED.duration_secs
                    ) >= $6 THEN $7
                    ELSE NULL
                END,
                last_watched = $7
            RETURNING {RECORD_COLUMNS},
                (wp.xmax = 0) AS inserted,
                (completed AND completed_at = $7) AS completed_now
            "#
        );

        let row = sqlx::query(&sql)
            .bind(write.user_id.to_uuid())
            .bind(write.episode_id.to_uuid())
            .bind(write.current_time)
            .bind(write.duration)
            .bind(write.force_complete)
            .bind(write.completion_threshold)
            .bind(write.now)
            .fetch_one(self.pool())
            .await
            .map_err(|e| {
                MediaError::Internal(format!("Failed to apply progress report: {e}"))
            })?;

        Self::map_outcome(&row)
    }

    async fn apply_completion(
        &self,
        write: &CompletionWrite,
    ) -> Result<ProgressOutcome> {
        let sql = format!(
            r#"
            INSERT INTO watch_progress AS wp (
                user_id, episode_id, current_time_secs, duration_secs,
                watch_percentage, completed, watch_count,
                last_watched, completed_at, created_at
            )
            VALUES (
                $1, $2, 0, $3, 0,
                $4 OR progress_percentage(0, $3) >= $5,
                0,
                $6,
                CASE WHEN $4 OR progress_percentage(0, $3) >= $5 THEN $6 ELSE NULL END,
                $6
            )
            ON CONFLICT (user_id, episode_id) DO UPDATE SET
                completed = wp.completed OR $4
                    OR progress_percentage(wp.current_time_secs, wp.duration_secs) >= $5,
                completed_at = CASE
                    WHEN wp.completed THEN wp.completed_at
                    WHEN $4 OR progress_percentage(wp.current_time_secs, wp.duration_secs) >= $5
                        THEN $6
                    ELSE NULL
                END,
                last_watched = $6
            RETURNING {RECORD_COLUMNS},
                (wp.xmax = 0) AS inserted,
                (completed AND completed_at = $6) AS completed_now
            "#
        );

        let row = sqlx::query(&sql)
            .bind(write.user_id.to_uuid())
            .bind(write.episode_id.to_uuid())
            .bind(write.duration)
            .bind(write.force_complete)
            .bind(write.completion_threshold)
            .bind(write.now)
            .fetch_one(self.pool())
            .await
            .map_err(|e| {
                MediaError::Internal(format!("Failed to apply completion: {e}"))
            })?;

        Self::map_outcome(&row)
    }

    async fn get_progress(
        &self,
        user_id: UserID,
        episode_id: EpisodeID,
    ) -> Result<Option<ProgressRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM watch_progress WHERE user_id = $1 AND episode_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_uuid())
            .bind(episode_id.to_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                MediaError::Internal(format!("Failed to load watch progress: {e}"))
            })?;

        row.as_ref()
            .map(Self::map_record)
            .transpose()
            .map_err(|e| {
                MediaError::Internal(format!("Failed to decode watch progress: {e}"))
            })
    }

    async fn list_for_user(&self, user_id: UserID) -> Result<Vec<ProgressRecord>> {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM watch_progress
            WHERE user_id = $1
            ORDER BY last_watched DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                MediaError::Internal(format!("Failed to list watch progress: {e}"))
            })?;

        Self::map_records(&rows)
    }

    async fn list_in_progress(
        &self,
        user_id: UserID,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>> {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM watch_progress
            WHERE user_id = $1
              AND NOT completed
              AND current_time_secs > 0
            ORDER BY last_watched DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_uuid())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                MediaError::Internal(format!("Failed to list in-progress items: {e}"))
            })?;

        Self::map_records(&rows)
    }

    async fn recount_movie_views(
        &self,
        movie_id: MovieID,
        mode: ViewCountMode,
    ) -> Result<Option<u64>> {
        let views = match mode {
            ViewCountMode::CompletedRecords => "COUNT(*)",
            ViewCountMode::DistinctViewers => "COUNT(DISTINCT wp.user_id)",
        };

        let mut tx = self.pool().begin().await.map_err(|e| {
            MediaError::Internal(format!("Failed to start transaction: {e}"))
        })?;

        // The row lock orders recounts of one movie. The UPDATE below takes
        // its snapshot only after the lock is held, so it sees every
        // completion committed before the previous recount released it.
        let locked = sqlx::query("SELECT id FROM movies WHERE id = $1 FOR UPDATE")
            .bind(movie_id.to_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| MediaError::Internal(format!("Failed to lock movie: {e}")))?;

        if locked.is_none() {
            tx.rollback().await.map_err(|e| {
                MediaError::Internal(format!("Failed to roll back transaction: {e}"))
            })?;
            return Ok(None);
        }

        let sql = format!(
            r#"
            UPDATE movies
            SET view_count = (
                    SELECT {views}
                    FROM watch_progress wp
                    JOIN episodes e ON e.id = wp.episode_id
                    WHERE e.movie_id = $1 AND wp.completed
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING view_count
            "#
        );
        let view_count: i64 = sqlx::query(&sql)
            .bind(movie_id.to_uuid())
            .fetch_one(&mut *tx)
            .await
            .and_then(|row| row.try_get("view_count"))
            .map_err(|e| {
                MediaError::Internal(format!("Failed to recount movie views: {e}"))
            })?;

        tx.commit().await.map_err(|e| {
            MediaError::Internal(format!("Failed to commit transaction: {e}"))
        })?;

        Ok(Some(view_count.max(0) as u64))
    }
}
