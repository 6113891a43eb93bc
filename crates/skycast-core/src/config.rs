//! Application configuration.
//!
//! Loaded from `config.toml` in the platform config directory, with
//! sensible defaults for every field so a missing file is never fatal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation issue.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue { field: field.into(), message: message.into() });
    }

    /// Add a warning.
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue { field: field.into(), message: message.into() });
    }

    /// Get a user-friendly message summarizing all errors.
    pub fn error_summary(&self) -> String {
        self.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
    }
}

/// Remote API endpoints and request parameters.
///
/// Open-Meteo: three read-only, keyless JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Forecast endpoint (current conditions + daily forecast).
    pub forecast_url: String,

    /// Historical archive endpoint (daily aggregates, decades back).
    pub archive_url: String,

    /// Geocoding endpoint (free-text place name to coordinates).
    pub geocoding_url: String,

    /// Timezone parameter sent with every data request.
    pub timezone: String,

    /// Result language for geocoding.
    pub language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            timezone: "auto".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Application behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// How long a cached API response stays trusted, in seconds.
    pub cache_duration_secs: u64,

    /// City shown when nothing has been searched yet.
    pub default_city: String,

    /// Hard timeout for any network request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_duration_secs: 300,
            default_city: "Warsaw".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory.
    pub config_dir: PathBuf,

    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Application settings.
    #[serde(default)]
    pub app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self { config_dir, api: ApiConfig::default(), app: AppConfig::default() }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let path = defaults.config_dir.join("config.toml");

        if !path.exists() {
            tracing::info!("No config file at {:?}, using defaults", path);
            return Ok(defaults);
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Write configuration to `config.toml` inside the config directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.config_dir)?;
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        std::fs::write(self.config_dir.join("config.toml"), contents)?;
        Ok(())
    }

    /// Validate field values, collecting every issue instead of failing fast.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (field, value) in [
            ("api.forecast_url", &self.api.forecast_url),
            ("api.archive_url", &self.api.archive_url),
            ("api.geocoding_url", &self.api.geocoding_url),
        ] {
            if Url::parse(value).is_err() {
                result.add_error(field, format!("not a valid URL: {}", value));
            }
        }

        if self.app.cache_duration_secs == 0 {
            result.add_warning("app.cache_duration_secs", "caching is disabled");
        }
        if self.app.request_timeout_secs == 0 {
            result.add_error("app.request_timeout_secs", "timeout must be non-zero");
        }
        if self.app.default_city.trim().is_empty() {
            result.add_error("app.default_city", "default city must not be empty");
        }

        result
    }
}
