//! Top-level [`VeloxConfig`] and its builder.

use serde::{Deserialize, Serialize};
use velox_telemetry::logging::LOG_LEVELS;

use crate::{ConfigError, LogFormat, LoggingConfig, RouterConfig};

/// Largest accepted `router.filter_hashes`.
pub const MAX_FILTER_HASHES: usize = 16;

/// Complete Velox configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to read it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use velox_config::VeloxConfig;
///
/// let config = VeloxConfig::default();
/// assert_eq!(config.router.filter_bits, 8192);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct VeloxConfig {
    /// Router tuning.
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeloxConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> VeloxConfigBuilder {
        VeloxConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `router.filter_bits` is zero
    /// - `router.filter_hashes` is outside `1..=16`
    /// - `logging.level` is not a known level
    /// - a `logging.directives` entry cannot be parsed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router.filter_bits == 0 {
            return Err(ConfigError::invalid_value(
                "router.filter_bits",
                "must be greater than zero",
            ));
        }

        if !(1..=MAX_FILTER_HASHES).contains(&self.router.filter_hashes) {
            return Err(ConfigError::invalid_value(
                "router.filter_hashes",
                format!("must be between 1 and {MAX_FILTER_HASHES}"),
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        self.logging
            .to_log_config()
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.directives", e.to_string()))
    }

    /// Local development preset: pretty, coloured, debug-level logs.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON logs at info and a frozen route table.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.router.freeze_on_start = true;
        config
    }
}

/// Builder for [`VeloxConfig`].
#[derive(Debug, Default)]
pub struct VeloxConfigBuilder {
    config: VeloxConfig,
}

impl VeloxConfigBuilder {
    /// Start from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the router section.
    #[must_use]
    pub fn router(mut self, router: RouterConfig) -> Self {
        self.config.router = router;
        self
    }

    /// Replace the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build without validation.
    #[must_use]
    pub fn build(self) -> VeloxConfig {
        self.config
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn build_validated(self) -> Result<VeloxConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
