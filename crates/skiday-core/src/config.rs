use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::types::{Criteria, SeasonWindow};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where to search from and which catalog to search in
    #[serde(default)]
    pub search: SearchConfig,

    /// Default thresholds for an evaluation
    #[serde(default)]
    pub criteria: Criteria,

    /// Period in which lifts are presumed open
    #[serde(default)]
    pub season: SeasonWindow,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// City used when none is given on the command line
    #[serde(default = "default_city")]
    pub default_city: String,

    /// TOML file replacing the built-in resort catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

fn default_city() -> String {
    "Munich".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            catalog_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_open_meteo_url")]
    pub open_meteo_url: String,

    /// IANA zone in which ski hours are interpreted
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub snow_forecast: SnowForecastConfig,
}

fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            open_meteo_url: default_open_meteo_url(),
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
            snow_forecast: SnowForecastConfig::default(),
        }
    }
}

/// snow-forecast.com feed credentials. Leave `client_id` empty to use Open-Meteo only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowForecastConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default = "default_snow_forecast_base")]
    pub api_base: String,
}

fn default_snow_forecast_base() -> String {
    "https://feeds.snow-forecast.com".to_string()
}

impl Default for SnowForecastConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_base: default_snow_forecast_base(),
        }
    }
}

impl SnowForecastConfig {
    /// Check if a client id is configured (not empty or a placeholder)
    pub fn is_configured(&self) -> bool {
        let id = self.client_id.trim();
        !id.is_empty() && !id.starts_with("YOUR_")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim search endpoint
    #[serde(default = "default_geocoding_url")]
    pub url: String,

    /// Nominatim's usage policy requires an identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_user_agent() -> String {
    format!("SkiDay/{} (command-line ski day checker)", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            url: default_geocoding_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            criteria: Criteria::default(),
            season: SeasonWindow::default(),
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.open_meteo_url, "weather.open_meteo_url", &mut result);
        self.validate_url(&self.geocoding.url, "geocoding.url", &mut result);

        if self.search.default_city.trim().is_empty() {
            result.add_error("search.default_city", "Default city must not be empty");
        }

        let c = &self.criteria;
        if c.min_temp > c.max_temp {
            result.add_error(
                "criteria.min_temp",
                format!("min_temp ({}) is above max_temp ({})", c.min_temp, c.max_temp),
            );
        }
        for (field, value) in [
            ("criteria.max_distance_km", c.max_distance_km),
            ("criteria.max_wind_kmh", c.max_wind_kmh),
            ("criteria.min_snow_top_cm", c.min_snow_top_cm),
            ("criteria.min_snow_bottom_cm", c.min_snow_bottom_cm),
            ("criteria.min_fresh_snow_cm", c.min_fresh_snow_cm),
        ] {
            if !value.is_finite() || value < 0.0 {
                result.add_error(field, format!("Must be a non-negative number, got {}", value));
            }
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }

        if self.weather.timezone.trim().is_empty() {
            result.add_error("weather.timezone", "Timezone must not be empty");
        }

        if self.weather.snow_forecast.is_configured() {
            self.validate_url(
                &self.weather.snow_forecast.api_base,
                "weather.snow_forecast.api_base",
                &mut result,
            );
        } else {
            result.add_warning(
                "weather.snow_forecast",
                "snow-forecast.com feed not configured - using Open-Meteo only",
            );
        }

        if let Some(path) = &self.search.catalog_path {
            if !path.exists() {
                result.add_error(
                    "search.catalog_path",
                    format!("Path does not exist: {}", path.display()),
                );
            }
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skiday");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_criteria() {
        let c = Config::default().criteria;
        assert_eq!(c.max_distance_km, 150.0);
        assert_eq!(c.min_temp, -15.0);
        assert_eq!(c.max_temp, 5.0);
        assert_eq!(c.max_wind_kmh, 50.0);
        assert_eq!(c.min_snow_top_cm, 30.0);
        assert_eq!(c.min_snow_bottom_cm, 10.0);
        assert!(!c.require_fresh_snow);
        assert_eq!(c.min_fresh_snow_cm, 5.0);
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.open_meteo_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_inverted_temperature_range() {
        let mut config = Config::default();
        config.criteria.min_temp = 10.0;
        config.criteria.max_temp = 0.0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "criteria.min_temp"));
    }

    #[test]
    fn test_negative_threshold() {
        let mut config = Config::default();
        config.criteria.max_wind_kmh = -1.0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "criteria.max_wind_kmh"));
    }

    #[test]
    fn test_snow_forecast_not_configured_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.snow_forecast"));
    }

    #[test]
    fn test_snow_forecast_placeholder_not_configured() {
        let mut cfg = SnowForecastConfig::default();
        assert!(!cfg.is_configured());
        cfg.client_id = "YOUR_CLIENT_ID".into();
        assert!(!cfg.is_configured());
        cfg.client_id = "abc123".into();
        assert!(cfg.is_configured());
    }

    #[test]
    fn test_load_creates_default_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.search.default_city, "Munich");

        let mut edited = created.clone();
        edited.search.default_city = "Innsbruck".into();
        edited.criteria.require_fresh_snow = true;
        edited.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.default_city, "Innsbruck");
        assert!(loaded.criteria.require_fresh_snow);
        assert_eq!(loaded.season, SeasonWindow::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndefault_city = \"Salzburg\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search.default_city, "Salzburg");
        assert_eq!(config.weather.timezone, "Europe/Berlin");
        assert_eq!(config.criteria, Criteria::default());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
