//! Configuration for the Marquee progress service.
//!
//! Settings are composed from environment variables (after `.env` is loaded),
//! an optional TOML file and built-in defaults, in that order of precedence.
//! Non-fatal problems are reported as [`ConfigWarnings`] next to the loaded
//! [`Config`] so the binary decides how loudly to surface them.

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::sources::{EnvConfig, FileConfig, SeedEpisode, SeedMovie};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, ServerConfig,
    TrackingConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
