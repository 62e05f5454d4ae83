use crate::error::ModelError;
use std::str::FromStr;
use uuid::Uuid;

/// Strongly typed ID for platform users.
///
/// Users are owned by the authentication service; the progress tracker only
/// ever receives their ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct UserID(pub Uuid);

impl UserID {
    pub fn new() -> Self {
        UserID(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserID {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserID {
    fn from(id: Uuid) -> Self {
        UserID(id)
    }
}

/// Strongly typed ID for catalog movies (single features and series alike)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct MovieID(pub Uuid);

impl MovieID {
    pub fn new() -> Self {
        MovieID(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MovieID {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for MovieID {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for MovieID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MovieID {
    fn from(id: Uuid) -> Self {
        MovieID(id)
    }
}

impl FromStr for MovieID {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ModelError::InvalidId(
                "Movie ID cannot be empty".to_string(),
            ));
        }
        Uuid::parse_str(s)
            .map(MovieID)
            .map_err(|e| ModelError::InvalidId(format!("{s}: {e}")))
    }
}

/// Strongly typed ID for episodes, the canonical trackable playback unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct EpisodeID(pub Uuid);

impl EpisodeID {
    pub fn new() -> Self {
        EpisodeID(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EpisodeID {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for EpisodeID {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for EpisodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EpisodeID {
    fn from(id: Uuid) -> Self {
        EpisodeID(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_id_parses_uuid_strings() {
        let raw = "0190f3a0-5c2e-7d4b-9a1f-3c2b1a0e9d8c";
        let id: MovieID = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn movie_id_rejects_empty_and_garbage() {
        assert!("".parse::<MovieID>().is_err());
        assert!("not-a-uuid".parse::<MovieID>().is_err());
    }
}
