//! Structured logging for Velox.
//!
//! Installs a global `tracing` subscriber with an [`EnvFilter`] and either a
//! JSON or a human-readable `fmt` layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use velox_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::development().with_directive("velox_router=debug"))?;
//!
//! tracing::info!(route.pattern = "/users/:id", "Route registered");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Levels accepted by [`LogConfig::level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Default log level (e.g., "info", "debug", "warn").
    pub level: String,

    /// Extra per-target directives such as `velox_router=debug`.
    pub directives: Vec<String>,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to colour human-readable output.
    pub ansi: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name recorded on the startup event.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            directives: Vec::new(),
            json_format: false,
            ansi: true,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "velox".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            directives: Vec::new(),
            json_format: true,
            ansi: false,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "velox".to_string(),
        }
    }

    /// Sets the default level.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Adds a per-target filter directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Checks the level and directives without installing anything.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidConfig`] for an unknown level or a
    /// directive the filter cannot parse.
    pub fn validate(&self) -> TelemetryResult<()> {
        if !LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(TelemetryError::InvalidConfig(format!(
                "unknown log level '{}', expected one of {}",
                self.level,
                LOG_LEVELS.join(", ")
            )));
        }
        self.filter_string()
            .parse::<EnvFilter>()
            .map(drop)
            .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))
    }

    /// The combined filter: level first, then directives.
    #[must_use]
    pub fn filter_string(&self) -> String {
        std::iter::once(self.level.to_lowercase())
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Initializes the logging subsystem.
///
/// `RUST_LOG`, when set, replaces the configured filter.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for a bad filter and
/// `TelemetryError::LoggingInit` if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    config.validate()?;
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.is_empty() => create_env_filter(&from_env)?,
        _ => create_env_filter(&config.filter_string())?,
    };

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::info!(service.name = %config.service_name, "logging initialized");
    Ok(())
}

/// Creates an env filter from a string.
///
/// # Arguments
///
/// * `filter` - Filter string (e.g., "info", "velox_router=debug,warn")
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidConfig(e.to_string()))
}

/// Standard log fields for Velox.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// Request ID field name.
    pub const REQUEST_ID: &str = "request_id";

    /// Trace ID field name.
    pub const TRACE_ID: &str = "trace_id";

    /// Span ID field name.
    pub const SPAN_ID: &str = "span_id";

    /// HTTP method field name.
    pub const HTTP_METHOD: &str = "http.method";

    /// HTTP path field name.
    pub const HTTP_PATH: &str = "http.path";

    /// Registered route method.
    pub const ROUTE_METHOD: &str = "route.method";

    /// Registered route pattern.
    pub const ROUTE_PATTERN: &str = "route.pattern";

    /// Tier a route was stored in (`static`, `dynamic`, `wildcard`).
    pub const ROUTE_TIER: &str = "tier";

    /// Duration field name (in milliseconds).
    pub const DURATION_MS: &str = "duration_ms";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Service name field name.
    pub const SERVICE_NAME: &str = "service.name";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        assert_eq!(LogConfig::default(), LogConfig::production());
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert!(config.ansi);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json_format);
        assert!(!config.span_events);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_filter_string() {
        let config = LogConfig::production()
            .with_level("WARN")
            .with_directive("velox_router=debug");
        assert_eq!(config.filter_string(), "warn,velox_router=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let config = LogConfig::production().with_level("loud");
        assert!(matches!(config.validate(), Err(TelemetryError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_directive() {
        let config = LogConfig::production().with_directive("velox_router=notalevel");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::ROUTE_METHOD, "route.method");
        assert_eq!(fields::ROUTE_PATTERN, "route.pattern");
        assert_eq!(fields::REQUEST_ID, "request_id");
    }

    #[test]
    fn test_create_env_filter_valid() {
        assert!(create_env_filter("info,velox_router=trace").is_ok());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": "debug", "service_name": "api"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.service_name, "api");
        assert!(config.json_format);
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
