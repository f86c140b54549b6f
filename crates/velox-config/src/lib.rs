//! Typed configuration for Velox.
//!
//! Two sections, both strict about unknown fields:
//!
//! ```toml
//! [router]
//! filter_bits = 8192        # static-route membership filter size
//! filter_hashes = 3
//! filter_min_routes = 10    # smaller static tables skip the filter
//! index_min_routes = 10     # larger dynamic sets get a first-segment index
//! freeze_on_start = false
//!
//! [logging]
//! level = "info"
//! format = "json"           # or "pretty"
//! ```
//!
//! Load with [`ConfigLoader`], then hand [`RouterConfig::registry_options`]
//! to the router and [`LoggingConfig::to_log_config`] to the telemetry crate.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{VeloxConfig, VeloxConfigBuilder, MAX_FILTER_HASHES};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, RouterConfig};
