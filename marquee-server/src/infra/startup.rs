use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use marquee_config::{CorsConfig, SeedMovie};
use marquee_core::Result;
use marquee_core::api_routes;
use marquee_core::database::infrastructure::memory::InMemoryCatalogRepository;

use crate::{AppState, handlers::health, routes::create_api_router};

/// Assemble the full application router with its middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config().cors);

    Router::new()
        .route(api_routes::HEALTH, get(health::health_handler))
        .merge(create_api_router())
        // TraceLayer is added last so it wraps CORS and sees every response
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_origin = if cors.is_wildcard_included() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Load the configured demo catalog into an in-memory catalog.
///
/// Returns the number of movies inserted.
pub async fn seed_catalog(
    catalog: &InMemoryCatalogRepository,
    movies: &[SeedMovie],
) -> Result<usize> {
    for seed in movies {
        catalog.insert_movie(seed.to_movie()).await;
        for episode in seed.to_episodes() {
            catalog.insert_episode(episode).await?;
        }
        debug!(
            movie_id = %seed.id,
            kind = %seed.kind,
            episodes = seed.episodes.len(),
            "seeded catalog movie"
        );
    }
    Ok(movies.len())
}
