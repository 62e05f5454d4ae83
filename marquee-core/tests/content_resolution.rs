mod support;

use std::sync::Arc;

use marquee_core::ContentResolver;
use marquee_core::database::infrastructure::memory::InMemoryCatalogRepository;
use marquee_core::database::ports::catalog::CatalogRepository;
use marquee_core::MediaError;
use marquee_model::{Episode, EpisodeID, MovieID, MovieKind};

use support::movie;

fn resolver(catalog: &InMemoryCatalogRepository) -> ContentResolver {
    ContentResolver::new(Arc::new(catalog.clone()))
}

#[tokio::test]
async fn episode_ids_resolve_to_themselves() -> anyhow::Result<()> {
    let catalog = InMemoryCatalogRepository::new();
    let series = MovieID::new();
    let episode = EpisodeID::new();
    catalog.insert_movie(movie(series, MovieKind::Series, 0.0)).await;
    catalog
        .insert_episode(Episode {
            id: episode,
            movie_id: series,
            episode_number: 3,
            duration: 1500.0,
            media_ref: None,
        })
        .await?;

    let stored = resolver(&catalog).resolve(episode.to_uuid(), None).await?;
    assert_eq!(stored.episode_id, episode);
    assert_eq!(stored.movie_id, series);
    assert_eq!(stored.duration, 1500.0);

    let supplied = resolver(&catalog)
        .resolve(episode.to_uuid(), Some(1512.5))
        .await?;
    assert_eq!(supplied.duration, 1512.5);
    Ok(())
}

#[tokio::test]
async fn single_movie_prefers_episode_one_then_any_episode() -> anyhow::Result<()> {
    let catalog = InMemoryCatalogRepository::new();
    let single = MovieID::new();
    catalog.insert_movie(movie(single, MovieKind::Single, 5400.0)).await;
    let stray = EpisodeID::new();
    catalog
        .insert_episode(Episode {
            id: stray,
            movie_id: single,
            episode_number: 2,
            duration: 5300.0,
            media_ref: None,
        })
        .await?;

    let resolved = resolver(&catalog).resolve(single.to_uuid(), None).await?;
    assert_eq!(resolved.episode_id, stray);
    assert_eq!(resolved.duration, 5300.0);
    assert_eq!(catalog.episode_count().await, 1);

    let first = EpisodeID::new();
    catalog
        .insert_episode(Episode {
            id: first,
            movie_id: single,
            episode_number: 1,
            duration: 5400.0,
            media_ref: None,
        })
        .await?;

    let resolved = resolver(&catalog).resolve(single.to_uuid(), None).await?;
    assert_eq!(resolved.episode_id, first);
    Ok(())
}

#[tokio::test]
async fn materialization_is_idempotent() -> anyhow::Result<()> {
    let catalog = InMemoryCatalogRepository::new();
    let single = MovieID::new();
    catalog.insert_movie(movie(single, MovieKind::Single, 90.0)).await;

    let first = resolver(&catalog).resolve(single.to_uuid(), None).await?;
    let second = resolver(&catalog).resolve(single.to_uuid(), Some(95.0)).await?;

    assert_eq!(first.episode_id, second.episode_id);
    assert_eq!(first.duration, 90.0);
    assert_eq!(second.duration, 95.0);
    assert_eq!(catalog.find_episodes_by_movie(single).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn series_and_unknown_ids_fail() {
    let catalog = InMemoryCatalogRepository::new();
    let series = MovieID::new();
    catalog.insert_movie(movie(series, MovieKind::Series, 0.0)).await;

    let err = resolver(&catalog)
        .resolve(series.to_uuid(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::InvalidTarget { .. }));

    let err = resolver(&catalog)
        .resolve(uuid::Uuid::now_v7(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::ContentNotFound(_)));
}
