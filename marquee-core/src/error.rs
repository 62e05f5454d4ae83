use thiserror::Error;
use uuid::Uuid;

use marquee_model::MovieID;

#[derive(Error, Debug)]
pub enum MediaError {
    /// Neither an episode nor a movie matches the supplied content id
    #[error("Content not found: {0}")]
    ContentNotFound(Uuid),

    /// A series id was used where an explicit episode id is required
    #[error(
        "Movie {movie_id} is a series; report progress against one of its episodes"
    )]
    InvalidTarget { movie_id: MovieID },

    #[error("Invalid progress: {0}")]
    InvalidProgress(String),

    #[error("Media not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Errors caused by the caller's input rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MediaError::ContentNotFound(_)
                | MediaError::InvalidTarget { .. }
                | MediaError::InvalidProgress(_)
                | MediaError::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
