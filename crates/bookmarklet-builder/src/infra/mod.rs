//! Infrastructure adapters for configuration, file IO, and logging.

pub mod config;
pub mod logging;
pub mod manifest_store;
