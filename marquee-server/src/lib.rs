//! HTTP surface of the Marquee progress service.
//!
//! The binary in `main.rs` loads configuration and picks a storage backend;
//! everything needed to assemble the router lives here so integration tests
//! can drive the same application in-process.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
pub use infra::startup::build_app;
