use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;

use marquee_model::ViewCountMode;

use crate::models::{
    Config, ConfigMetadata, CorsConfig, DEFAULT_CONTINUE_WATCHING_LIMIT,
    DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, DEFAULT_PORT,
    DatabaseConfig, ServerConfig, TrackingConfig,
    sources::{EnvConfig, FileConfig},
};
use crate::validation::{self, ConfigWarnings};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("marquee.toml"),
        PathBuf::from("config/marquee.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the process environment and compose the config.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_from_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose the config from an already gathered environment.
    pub fn load_from_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // An explicitly named file must exist; default locations are optional
        let (path, explicit) = match (&self.options.config_path, &env.config_path) {
            (Some(path), _) | (None, Some(path)) => (Some(path.clone()), true),
            (None, None) => (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                    .cloned(),
                false,
            ),
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No marquee.toml detected; falling back to environment variables",
            "Create marquee.toml or point MARQUEE_CONFIG_PATH at a configuration file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        tracking: file_tracking,
        cors: file_cors,
        catalog: file_catalog,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let database = DatabaseConfig {
        primary_url: env
            .database_url
            .or(file_database.primary_url)
            .filter(|url| !url.trim().is_empty()),
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        min_connections: env
            .database_min_connections
            .or(file_database.min_connections)
            .unwrap_or(DEFAULT_MIN_CONNECTIONS),
    };

    let env_view_count_mode = env
        .view_count_mode
        .as_deref()
        .map(parse_view_count_mode)
        .transpose()?;

    let defaults = TrackingConfig::default();
    let tracking = TrackingConfig {
        completion_threshold: env
            .completion_threshold
            .or(file_tracking.completion_threshold)
            .unwrap_or(defaults.completion_threshold),
        view_count_mode: env_view_count_mode
            .or(file_tracking.view_count_mode)
            .unwrap_or(defaults.view_count_mode),
        continue_watching_limit: env
            .continue_watching_limit
            .or(file_tracking.continue_watching_limit)
            .unwrap_or(DEFAULT_CONTINUE_WATCHING_LIMIT),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
    };

    let mut config = Config {
        server,
        database,
        tracking,
        cors,
        catalog: file_catalog.movies,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    };

    warnings.extend(validation::apply_guard_rails(&mut config));

    Ok((config, warnings))
}

fn parse_view_count_mode(raw: &str) -> Result<ViewCountMode, ConfigLoadError> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "completed_records" => Ok(ViewCountMode::CompletedRecords),
        "distinct_viewers" => Ok(ViewCountMode::DistinctViewers),
        _ => Err(ConfigLoadError::InvalidValue {
            field: "MARQUEE_VIEW_COUNT_MODE",
            value: raw.to_string(),
        }),
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_count_mode_accepts_common_spellings() {
        assert_eq!(
            parse_view_count_mode("distinct-viewers").unwrap(),
            ViewCountMode::DistinctViewers
        );
        assert_eq!(
            parse_view_count_mode(" Completed_Records ").unwrap(),
            ViewCountMode::CompletedRecords
        );
        assert!(parse_view_count_mode("unique").is_err());
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let (config, warnings) =
            compose_config(None, EnvConfig::default(), None).unwrap();

        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.tracking, TrackingConfig::default());
        assert!(config.database.primary_url.is_none());
        assert!(
            warnings
                .iter()
                .any(|w| w.message.contains("No marquee.toml"))
        );
    }
}
