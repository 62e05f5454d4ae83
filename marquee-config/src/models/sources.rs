use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use marquee_model::{
    Episode, EpisodeID, Movie, MovieID, MovieKind, ViewCountMode,
};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub tracking: FileTrackingConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTrackingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count_mode: Option<ViewCountMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_watching_limit: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCatalogConfig {
    #[serde(default)]
    pub movies: Vec<SeedMovie>,
}

/// Catalog entry loaded by the in-memory run mode
///
/// ```toml
/// [[catalog.movies]]
/// id = "0190f3a0-5c2e-7d4b-9a1f-3c2b1a0e9d8c"
/// kind = "series"
/// duration = 0.0
///
/// [[catalog.movies.episodes]]
/// id = "0190f3a1-0000-7000-8000-000000000007"
/// episode_number = 7
/// duration = 2640.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SeedMovie {
    pub id: MovieID,
    pub kind: MovieKind,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episodes: Vec<SeedEpisode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SeedEpisode {
    pub id: EpisodeID,
    pub episode_number: i32,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_ref: Option<String>,
}

impl SeedMovie {
    pub fn to_movie(&self) -> Movie {
        Movie {
            id: self.id,
            kind: self.kind,
            duration: self.duration,
            media_ref: self.media_ref.clone(),
            view_count: 0,
        }
    }

    pub fn to_episodes(&self) -> Vec<Episode> {
        self.episodes
            .iter()
            .map(|episode| Episode {
                id: episode.id,
                movie_id: self.id,
                episode_number: episode.episode_number,
                duration: episode.duration,
                media_ref: episode.media_ref.clone(),
            })
            .collect()
    }
}

/// Values picked up from the process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub database_min_connections: Option<u32>,
    pub completion_threshold: Option<f64>,
    /// Kept raw so an unknown mode can be reported instead of ignored
    pub view_count_mode: Option<String>,
    pub continue_watching_limit: Option<usize>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("MARQUEE_CONFIG_PATH")
                .ok()
                .map(PathBuf::from),
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: parse_var("SERVER_PORT"),
            database_url: std::env::var("DATABASE_URL").ok(),
            database_max_connections: parse_var("DB_MAX_CONNECTIONS"),
            database_min_connections: parse_var("DB_MIN_CONNECTIONS"),
            completion_threshold: parse_var("MARQUEE_COMPLETION_THRESHOLD"),
            view_count_mode: std::env::var("MARQUEE_VIEW_COUNT_MODE").ok(),
            continue_watching_limit: parse_var("MARQUEE_CONTINUE_WATCHING_LIMIT"),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| split_csv(&raw))
}

pub(crate) fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_values_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            split_csv(" http://a.test, ,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn seed_catalog_parses_nested_episodes() {
        let raw = r#"
            [[movies]]
            id = "0190f3a0-5c2e-7d4b-9a1f-3c2b1a0e9d8c"
            kind = "single"
            duration = 5400.0
            media_ref = "movies/heat.mkv"

            [[movies]]
            id = "0190f3a0-5c2e-7d4b-9a1f-3c2b1a0e9d8d"
            kind = "series"

            [[movies.episodes]]
            id = "0190f3a1-0000-7000-8000-000000000007"
            episode_number = 7
            duration = 2640.0
        "#;

        let catalog: FileCatalogConfig = toml::from_str(raw).unwrap();
        assert_eq!(catalog.movies.len(), 2);
        assert_eq!(catalog.movies[0].kind, MovieKind::Single);
        assert!(catalog.movies[0].episodes.is_empty());

        let series = &catalog.movies[1];
        let episodes = series.to_episodes();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].movie_id, series.id);
        assert_eq!(episodes[0].episode_number, 7);
        assert_eq!(series.to_movie().view_count, 0);
    }
}
