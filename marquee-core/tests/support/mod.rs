#![allow(dead_code)]

use std::sync::Arc;

use marquee_core::database::infrastructure::memory::InMemoryCatalogRepository;
use marquee_core::{AppUnitOfWork, ProgressTracker, TrackerSettings};
use marquee_model::{
    Episode, EpisodeID, Movie, MovieID, MovieKind, UserID,
};
use uuid::Uuid;

use marquee_core::api_types::{MarkCompleteRequest, ReportProgressRequest};

/// In-memory catalog with one series (episode #7 seeded) and one single movie
/// that has no episode yet.
pub struct Fixture {
    pub catalog: InMemoryCatalogRepository,
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub tracker: ProgressTracker,
    pub series: MovieID,
    pub episode7: EpisodeID,
    pub single: MovieID,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_settings(TrackerSettings::default()).await
    }

    pub async fn with_settings(settings: TrackerSettings) -> Self {
        let catalog = InMemoryCatalogRepository::new();
        let series = MovieID::new();
        let single = MovieID::new();
        let episode7 = EpisodeID::new();

        catalog.insert_movie(movie(series, MovieKind::Series, 0.0)).await;
        catalog.insert_movie(movie(single, MovieKind::Single, 120.0)).await;
        catalog
            .insert_episode(Episode {
                id: episode7,
                movie_id: series,
                episode_number: 7,
                duration: 100.0,
                media_ref: Some("series/s01e07.mkv".into()),
            })
            .await
            .expect("series exists");

        let unit_of_work = Arc::new(AppUnitOfWork::in_memory(catalog.clone()));
        let tracker = ProgressTracker::new(Arc::clone(&unit_of_work), settings);

        Self {
            catalog,
            unit_of_work,
            tracker,
            series,
            episode7,
            single,
        }
    }

    pub async fn view_count(&self, movie_id: MovieID) -> i64 {
        self.unit_of_work
            .catalog
            .get_movie(movie_id)
            .await
            .expect("catalog read")
            .expect("movie exists")
            .view_count
    }
}

pub fn movie(id: MovieID, kind: MovieKind, duration: f64) -> Movie {
    Movie {
        id,
        kind,
        duration,
        media_ref: Some(format!("movies/{id}.mkv")),
        view_count: 0,
    }
}

pub fn report(
    user_id: UserID,
    content_id: Uuid,
    current_time: f64,
    duration: Option<f64>,
) -> ReportProgressRequest {
    ReportProgressRequest {
        user_id,
        content_id,
        current_time,
        duration,
        force_complete: false,
    }
}

pub fn complete(
    user_id: UserID,
    content_id: Uuid,
    force_complete: bool,
) -> MarkCompleteRequest {
    MarkCompleteRequest {
        user_id,
        content_id,
        force_complete,
    }
}
