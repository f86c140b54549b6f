//! Configuration sections.

use serde::{Deserialize, Serialize};
use velox_router::RegistryOptions;
use velox_telemetry::LogConfig;

/// Router tuning.
///
/// ```
/// use velox_config::RouterConfig;
///
/// let options = RouterConfig::default().registry_options();
/// assert_eq!(options.filter_bits, 8192);
/// assert_eq!(options.filter_hashes, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Size of the static-route membership filter, in bits.
    #[serde(default = "default_filter_bits")]
    pub filter_bits: usize,

    /// Bit positions probed per key.
    #[serde(default = "default_filter_hashes")]
    pub filter_hashes: usize,

    /// Static tables with fewer routes than this skip the filter.
    #[serde(default = "default_min_routes")]
    pub filter_min_routes: usize,

    /// Dynamic sets with more routes than this get a first-segment index.
    #[serde(default = "default_min_routes")]
    pub index_min_routes: usize,

    /// Freeze the route table once the application has registered its routes.
    #[serde(default)]
    pub freeze_on_start: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            filter_bits: default_filter_bits(),
            filter_hashes: default_filter_hashes(),
            filter_min_routes: default_min_routes(),
            index_min_routes: default_min_routes(),
            freeze_on_start: false,
        }
    }
}

impl RouterConfig {
    /// Registry options carrying these values.
    #[must_use]
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            filter_bits: self.filter_bits,
            filter_hashes: self.filter_hashes,
            filter_min_routes: self.filter_min_routes,
            index_min_routes: self.index_min_routes,
        }
    }
}

fn default_filter_bits() -> usize {
    8192
}

fn default_filter_hashes() -> usize {
    3
}

fn default_min_routes() -> usize {
    10
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default level: trace, debug, info, warn or error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Colour pretty output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include file and line in each event.
    #[serde(default)]
    pub include_location: bool,

    /// Extra filter directives, e.g. `velox_router=debug`.
    #[serde(default)]
    pub directives: Vec<String>,

    /// Service name recorded when logging starts.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
            directives: Vec::new(),
            service_name: default_service_name(),
        }
    }
}

impl LoggingConfig {
    /// The subscriber settings this section describes.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            directives: self.directives.clone(),
            json_format: self.format == LogFormat::Json,
            ansi: self.ansi_enabled,
            file_line_info: self.include_location,
            service_name: self.service_name.clone(),
            ..base
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        config.to_log_config()
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "velox".to_string()
}
