//! Structured logging for Velox services.
//!
//! The router itself only emits `tracing` events at registration time (route
//! added or removed, index built, registry frozen). This crate installs the
//! subscriber that turns those events into JSON or human-readable output.
//!
//! # Example
//!
//! ```rust,ignore
//! use velox_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_service_name("api-gateway"))?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
