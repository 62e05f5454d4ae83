//! Storage adapters for the repository ports.

pub mod memory;

#[cfg(feature = "database")]
pub mod postgres;
