//! Layered configuration loading.
//!
//! Layers apply in order, later ones winning:
//! 1. Built-in defaults or a preset
//! 2. A TOML or JSON file (or string)
//! 3. `PREFIX__SECTION__KEY` environment variables

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, VeloxConfig};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use velox_config::ConfigLoader;
///
/// # fn main() -> Result<(), velox_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("velox.toml")?
///     .with_env_prefix("VELOX")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: VeloxConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: VeloxConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = VeloxConfig::default();
        self
    }

    /// Reset to the development preset.
    ///
    /// ```
    /// use velox_config::{ConfigLoader, LogFormat};
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = VeloxConfig::development();
        self
    }

    /// Reset to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = VeloxConfig::production();
        self
    }

    /// Load a file, choosing TOML or JSON by extension.
    ///
    /// The file replaces the current layer; sections and fields it omits
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is neither `.toml` nor `.json`
    /// - The content is invalid or names an unknown field
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Load a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file is present.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration text in the given format (`"toml"` or `"json"`).
    ///
    /// ```
    /// use velox_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[router]\nfilter_bits = 4096", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.router.filter_bits, 4096);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown format or unparsable content.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Read overrides from `PREFIX__SECTION__KEY` variables at load time.
    ///
    /// With prefix `VELOX`:
    /// - `VELOX__ROUTER__FILTER_BITS=16384`
    /// - `VELOX__LOGGING__FORMAT=pretty`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the working directory, if present.
    ///
    /// Variables already set in the process environment are kept.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if `.env` exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::read_error(".env", std::io::Error::other(e))),
        }
    }

    /// Load a specific dotenv file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        dotenvy::from_path(path)
            .map_err(|e| ConfigError::read_error(path, std::io::Error::other(e)))?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation fails.
    pub fn load(mut self) -> Result<VeloxConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the current layer without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> VeloxConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Another prefix that merely starts with ours, e.g. VELOXY__.
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let router = &mut self.config.router;
        let logging = &mut self.config.logging;

        match parts.as_slice() {
            ["ROUTER", "FILTER_BITS"] => router.filter_bits = parse_usize(key, value)?,
            ["ROUTER", "FILTER_HASHES"] => router.filter_hashes = parse_usize(key, value)?,
            ["ROUTER", "FILTER_MIN_ROUTES"] => router.filter_min_routes = parse_usize(key, value)?,
            ["ROUTER", "INDEX_MIN_ROUTES"] => router.index_min_routes = parse_usize(key, value)?,
            ["ROUTER", "FREEZE_ON_START"] => router.freeze_on_start = parse_flag(key, value)?,

            ["LOGGING", "ENABLED"] => logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => logging.ansi_enabled = parse_flag(key, value)?,
            ["LOGGING", "INCLUDE_LOCATION"] => logging.include_location = parse_flag(key, value)?,
            ["LOGGING", "DIRECTIVES"] => {
                logging.directives = value
                    .split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(String::from)
                    .collect();
            }
            ["LOGGING", "SERVICE_NAME"] => logging.service_name = value.to_string(),

            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<VeloxConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected non-negative integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, VeloxConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.router.freeze_on_start);
    }

    #[test]
    fn test_with_defaults_resets_preset() {
        let config = ConfigLoader::new()
            .with_development()
            .with_defaults()
            .load()
            .unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"router": {"index_min_routes": 0}, "logging": {"level": "warn"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.router.index_min_routes, 0);
        assert_eq!(config.router.filter_bits, 8192);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("router: {}", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_string_replaces_preset() {
        let config = ConfigLoader::new()
            .with_production()
            .with_string("[router]\nfilter_bits = 64", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.router.filter_bits, 64);
        assert!(!config.router.freeze_on_start);
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[router]\nfilter_hashes = 40", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated_skips_validation() {
        let config = ConfigLoader::new()
            .with_string("[router]\nfilter_bits = 0", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.router.filter_bits, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/velox.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/velox.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, VeloxConfig::default());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_apply_env_var_router() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__ROUTER__FILTER_BITS", "16384", "TEST").unwrap();
        loader.apply_env_var("TEST__ROUTER__FREEZE_ON_START", "yes", "TEST").unwrap();
        assert_eq!(loader.config.router.filter_bits, 16384);
        assert!(loader.config.router.freeze_on_start);
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "Pretty", "TEST").unwrap();
        loader
            .apply_env_var("TEST__LOGGING__DIRECTIVES", "velox_router=debug, ,hyper=warn", "TEST")
            .unwrap();
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert_eq!(
            loader.config.logging.directives,
            vec!["velox_router=debug", "hyper=warn"]
        );
    }

    #[test]
    fn test_apply_env_var_invalid_integer() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__ROUTER__FILTER_HASHES", "three", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn test_apply_env_var_invalid_format() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_and_foreign_keys() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__PORT", "80", "TEST").unwrap();
        loader.apply_env_var("TESTING__ROUTER__FILTER_BITS", "1", "TEST").unwrap();
        assert_eq!(loader.config, VeloxConfig::default());
    }
}
