//! Catalog entities as seen by the progress tracker.
//!
//! The catalog service owns movies and episodes; these types only carry the
//! fields needed to resolve content ids onto trackable episodes and to publish
//! the per-movie view aggregate.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::ModelError;
use crate::ids::{EpisodeID, MovieID};

/// Whether a movie is a single playable unit or a multi-episode series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "movie_kind", rename_all = "lowercase")
)]
pub enum MovieKind {
    /// Feature film or any other content with exactly one playback unit
    Single,
    /// Content made of explicitly numbered episodes
    Series,
}

impl MovieKind {
    pub fn is_series(&self) -> bool {
        matches!(self, MovieKind::Series)
    }
}

impl Display for MovieKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieKind::Single => write!(f, "single"),
            MovieKind::Series => write!(f, "series"),
        }
    }
}

impl FromStr for MovieKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(MovieKind::Single),
            "series" => Ok(MovieKind::Series),
            other => Err(ModelError::InvalidMovieKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movie {
    pub id: MovieID,
    pub kind: MovieKind,
    /// Nominal runtime in seconds
    pub duration: f64,
    /// Opaque pointer into media storage (object key, stream id, ...)
    pub media_ref: Option<String>,
    /// Derived aggregate, only ever written by the view aggregator
    pub view_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Episode {
    pub id: EpisodeID,
    pub movie_id: MovieID,
    pub episode_number: i32,
    /// Nominal runtime in seconds
    pub duration: f64,
    pub media_ref: Option<String>,
}

/// Payload for materializing an episode in the catalog.
///
/// Creation is keyed by `(movie_id, episode_number)`; creating the same pair
/// twice yields the episode that already exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub movie_id: MovieID,
    pub episode_number: i32,
    pub duration: f64,
    pub media_ref: Option<String>,
}

/// Canonical trackable unit produced by content resolution
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeRef {
    pub episode_id: EpisodeID,
    pub movie_id: MovieID,
    /// Duration the tracker should use; a caller-supplied value wins over the
    /// catalog's stored runtime.
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_kind_parses_case_insensitively() {
        assert_eq!("Single".parse::<MovieKind>().unwrap(), MovieKind::Single);
        assert_eq!(" series ".parse::<MovieKind>().unwrap(), MovieKind::Series);
        assert!("miniseries".parse::<MovieKind>().is_err());
    }
}
