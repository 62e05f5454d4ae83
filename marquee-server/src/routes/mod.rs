pub mod v1;

use crate::AppState;
use axum::Router;
use marquee_core::api_routes;

/// Create the main API router with all versions
pub fn create_api_router() -> Router<AppState> {
    Router::new().nest(api_routes::v1::ROOT, v1::create_v1_router())
}
