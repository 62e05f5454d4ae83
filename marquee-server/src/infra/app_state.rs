use std::{fmt, sync::Arc};

use marquee_config::{Config, TrackingConfig};
use marquee_core::database::PostgresDatabase;
use marquee_core::{AppUnitOfWork, ProgressTracker, TrackerSettings};

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub tracker: Arc<ProgressTracker>,
    /// Present when running against PostgreSQL; `None` in the in-memory mode
    pub postgres: Option<Arc<PostgresDatabase>>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("unit_of_work", &self.unit_of_work)
            .field("storage", &self.storage_kind())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        unit_of_work: Arc<AppUnitOfWork>,
        postgres: Option<Arc<PostgresDatabase>>,
        config: Config,
    ) -> Self {
        let tracker = Arc::new(ProgressTracker::new(
            Arc::clone(&unit_of_work),
            tracker_settings(&config.tracking),
        ));

        Self {
            unit_of_work,
            tracker,
            postgres,
            config: Arc::new(config),
        }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage_kind(&self) -> &'static str {
        if self.postgres.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}

pub fn tracker_settings(tracking: &TrackingConfig) -> TrackerSettings {
    TrackerSettings {
        completion_threshold: tracking.completion_threshold,
        view_count_mode: tracking.view_count_mode,
        continue_watching_limit: tracking.continue_watching_limit,
    }
}
