//! # Marquee Core
//!
//! Playback-progress tracking for the Marquee streaming platform.
//!
//! ## Overview
//!
//! Every piece of playable content is tracked as an *episode*: series
//! episodes directly, single-unit movies through a canonical episode #1 that
//! is materialized on first playback. For each (user, episode) pair the crate
//! keeps one progress record with a one-way completion latch, and derives each
//! movie's `view_count` from the completed records of its episodes.
//!
//! ## Architecture
//!
//! - [`domain::watch`]: content resolution, the progress tracker and the view
//!   aggregator
//! - [`database::ports`]: repository traits for the catalog and progress store
//! - [`database::infrastructure`]: PostgreSQL and in-memory adapters
//! - [`application::unit_of_work`]: the repository bundle handed to services
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL adapters through SQLx (default)
//! - `postgres-tests`: behaviour tests that need a live database

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Versioned HTTP route constants shared by the server and its clients
pub mod api_routes;

/// Request/response payloads for the progress API
pub mod api_types;

/// Repository composition used by application services
pub mod application;

/// Database ports and their PostgreSQL / in-memory implementations
pub mod database;

/// Progress tracking domain services
pub mod domain;

/// Error types and error handling utilities
pub mod error;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{MediaError, Result};

pub use application::unit_of_work::AppUnitOfWork;
pub use domain::watch::{
    ContentResolver, ProgressTracker, TrackerSettings, ViewAggregator,
};
pub use marquee_model as model;
