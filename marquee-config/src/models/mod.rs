pub mod sources;

use std::path::PathBuf;

use marquee_model::{DEFAULT_COMPLETION_THRESHOLD, ViewCountMode};

use sources::SeedMovie;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_CONTINUE_WATCHING_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tracking: TrackingConfig,
    pub cors: CorsConfig,
    /// Demo catalog for the in-memory run mode
    pub catalog: Vec<SeedMovie>,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Watch percentage at which a record latches into completed
    pub completion_threshold: f64,
    pub view_count_mode: ViewCountMode,
    pub continue_watching_limit: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            view_count_mode: ViewCountMode::default(),
            continue_watching_limit: DEFAULT_CONTINUE_WATCHING_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
