macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

pub const HEALTH: &str = "/health";

/// Versioned API route definitions shared across Marquee services
pub mod v1 {
    pub const ROOT: &str = "/api/v1";

    pub mod watch {
        pub const PROGRESS: &str = v1_path!("/watch/progress");
        pub const COMPLETE: &str = v1_path!("/watch/complete");
        pub const USER_PROGRESS: &str = v1_path!("/watch/progress/{user_id}");
        pub const CONTINUE: &str = v1_path!("/watch/continue/{user_id}");
    }

    pub mod movies {
        pub const RECOMPUTE_VIEWS: &str =
            v1_path!("/movies/{movie_id}/views/recompute");
    }
}

pub mod utils {
    /// Replace a single path parameter (e.g. `"{user_id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Append query parameters to the provided route.
    pub fn with_query(route: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return route.to_string();
        }
        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{route}?{query}")
    }
}
