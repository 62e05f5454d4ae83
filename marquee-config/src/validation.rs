use marquee_model::DEFAULT_COMPLETION_THRESHOLD;

use crate::models::{Config, DEFAULT_CONTINUE_WATCHING_LIMIT};

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Replace out-of-range values with safe defaults, recording a warning for
/// each correction.
pub fn apply_guard_rails(config: &mut Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    let threshold = config.tracking.completion_threshold;
    if !(threshold > 0.0 && threshold <= 100.0) {
        warnings.push_with_hint(
            format!(
                "completion_threshold {threshold} is outside (0, 100]; using {DEFAULT_COMPLETION_THRESHOLD}"
            ),
            "Set tracking.completion_threshold to a percentage such as 90 or 95",
        );
        config.tracking.completion_threshold = DEFAULT_COMPLETION_THRESHOLD;
    }

    if config.tracking.continue_watching_limit == 0 {
        warnings.push(format!(
            "continue_watching_limit of 0 would always return nothing; using {DEFAULT_CONTINUE_WATCHING_LIMIT}"
        ));
        config.tracking.continue_watching_limit = DEFAULT_CONTINUE_WATCHING_LIMIT;
    }

    let database = &mut config.database;
    if database.max_connections == 0 {
        warnings.push("database.max_connections must be at least 1; using 1");
        database.max_connections = 1;
    }
    if database.min_connections > database.max_connections {
        warnings.push(format!(
            "database.min_connections ({}) exceeds max_connections ({}); clamping",
            database.min_connections, database.max_connections
        ));
        database.min_connections = database.max_connections;
    }

    if database.primary_url.is_none() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; only the in-memory mode can start",
            "Set DATABASE_URL or database.primary_url, or run with --in-memory",
        );
    }

    if config.cors.is_wildcard_included() {
        warnings.push("CORS allows any origin");
    }

    warnings
}
