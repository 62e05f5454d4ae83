mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use marquee_core::database::infrastructure::memory::{
    InMemoryCatalogRepository, InMemoryWatchProgressRepository,
};
use marquee_core::database::ports::catalog::CatalogRepository;
use marquee_core::database::ports::watch_progress::{
    CompletionWrite, ProgressOutcome, ProgressWrite, WatchProgressRepository,
};
use marquee_core::{AppUnitOfWork, ProgressTracker, Result, TrackerSettings};
use marquee_model::{
    EpisodeID, MovieID, MovieKind, ProgressRecord, UserID, ViewCountMode,
};

use support::{Fixture, movie, report};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_reports_create_one_record_and_one_episode() {
    let fx = Fixture::new().await;
    let user = UserID::new();
    let content = fx.single.to_uuid();

    let reports = (1..=32_i32).map(|i| {
        let tracker = fx.tracker.clone();
        tokio::spawn(async move {
            tracker
                .report_progress(&report(user, content, f64::from(i), None))
                .await
        })
    });
    let results = join_all(reports).await;

    let episode_ids: std::collections::HashSet<_> = results
        .into_iter()
        .map(|joined| joined.expect("task joined").expect("report applied").episode_id)
        .collect();
    assert_eq!(episode_ids.len(), 1);
    assert_eq!(fx.catalog.episode_count().await, 2);

    let records = fx.tracker.list_progress(user).await.expect("listing");
    assert_eq!(records.len(), 1);
    // The furthest position always wins regardless of arrival order
    assert_eq!(records[0].current_time, 32.0);
    assert!(records[0].watch_count >= 1 && records[0].watch_count <= 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_completions_count_one_view_per_record() {
    let fx = Fixture::new().await;
    let users: Vec<UserID> = (0..8).map(|_| UserID::new()).collect();
    let episode = fx.episode7.to_uuid();

    let reports = users.iter().flat_map(|&user| {
        [96.0, 97.0, 99.0, 100.0].into_iter().map(move |position| (user, position))
    });
    let tasks = reports.map(|(user, position)| {
        let tracker = fx.tracker.clone();
        tokio::spawn(async move {
            tracker
                .report_progress(&report(user, episode, position, Some(100.0)))
                .await
        })
    });
    for joined in join_all(tasks).await {
        joined.expect("task joined").expect("report applied");
    }

    for &user in &users {
        let records = fx.tracker.list_progress(user).await.expect("listing");
        assert_eq!(records.len(), 1);
        assert!(records[0].completed);
        assert_eq!(records[0].current_time, 100.0);
    }

    // Each completion's recount ran after its own write, so the last one to
    // store a value saw every completion
    assert_eq!(fx.view_count(fx.series).await, users.len() as i64);
}

/// Progress store whose first view recount stalls before it starts counting
#[derive(Debug, Clone)]
struct StallingRecountStore {
    inner: InMemoryWatchProgressRepository,
    stalled: Arc<AtomicBool>,
}

#[async_trait]
impl WatchProgressRepository for StallingRecountStore {
    async fn apply_report(&self, write: &ProgressWrite) -> Result<ProgressOutcome> {
        self.inner.apply_report(write).await
    }

    async fn apply_completion(&self, write: &CompletionWrite) -> Result<ProgressOutcome> {
        self.inner.apply_completion(write).await
    }

    async fn get_progress(
        &self,
        user_id: UserID,
        episode_id: EpisodeID,
    ) -> Result<Option<ProgressRecord>> {
        self.inner.get_progress(user_id, episode_id).await
    }

    async fn list_for_user(&self, user_id: UserID) -> Result<Vec<ProgressRecord>> {
        self.inner.list_for_user(user_id).await
    }

    async fn list_in_progress(
        &self,
        user_id: UserID,
        limit: usize,
    ) -> Result<Vec<ProgressRecord>> {
        self.inner.list_in_progress(user_id, limit).await
    }

    async fn recount_movie_views(
        &self,
        movie_id: MovieID,
        mode: ViewCountMode,
    ) -> Result<Option<u64>> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.inner.recount_movie_views(movie_id, mode).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn late_finishing_recount_stores_the_current_count() -> anyhow::Result<()> {
    let catalog = InMemoryCatalogRepository::new();
    let movie_id = MovieID::new();
    catalog.insert_movie(movie(movie_id, MovieKind::Single, 100.0)).await;

    let store = StallingRecountStore {
        inner: InMemoryWatchProgressRepository::new(catalog.clone()),
        stalled: Arc::new(AtomicBool::new(false)),
    };
    let unit_of_work = Arc::new(AppUnitOfWork::new(
        Arc::new(catalog.clone()),
        Arc::new(store),
    ));
    let tracker = ProgressTracker::new(Arc::clone(&unit_of_work), TrackerSettings::default());

    let first = {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            tracker
                .report_progress(&report(UserID::new(), movie_id.to_uuid(), 100.0, None))
                .await
        })
    };
    // Let the first completion reach its stalled recount
    tokio::time::sleep(Duration::from_millis(20)).await;
    tracker
        .report_progress(&report(UserID::new(), movie_id.to_uuid(), 100.0, None))
        .await?;
    first.await??;

    let stored = catalog.get_movie(movie_id).await?.map(|m| m.view_count);
    assert_eq!(stored, Some(2));
    Ok(())
}
