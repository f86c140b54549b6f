//! Startup errors.

use thiserror::Error;

/// Anything that can go wrong while bringing a router up.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] velox_config::ConfigError),

    /// Route registration or router construction failed.
    #[error(transparent)]
    Router(#[from] velox_router::RouterError),

    /// The logging subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] velox_telemetry::TelemetryError),
}

/// Result alias for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
