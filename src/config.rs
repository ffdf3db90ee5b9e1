//! Configuration management for `WeatherChat`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherChatError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `WeatherChat` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherChatConfig {
    /// Geocoding lookup settings
    pub geocoding: GeocodingConfig,
    /// Current-weather lookup settings
    pub weather: WeatherConfig,
    /// Outbound HTTP client settings
    pub http: HttpConfig,
    /// Conversation behaviour
    pub chat: ChatConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Web front-end settings
    pub server: ServerConfig,
}

/// Geocoding API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL for the geocoding API
    pub base_url: String,
    /// Language of returned place names
    pub language: String,
    /// Number of candidates to request; only the first one is used
    pub result_count: u32,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
}

/// Conversation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Pause before asking the user to name a city, in milliseconds
    pub clarify_delay_ms: u64,
    /// Extracted queries shorter than this trigger the clarification prompt
    pub min_query_chars: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the static chat page
    pub static_dir: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_geocoding_language() -> String {
    "en".to_string()
}

fn default_geocoding_result_count() -> u32 {
    1
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_user_agent() -> String {
    format!("WeatherChat/{}", crate::VERSION)
}

fn default_clarify_delay_ms() -> u64 {
    500
}

fn default_min_query_chars() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            language: default_geocoding_language(),
            result_count: default_geocoding_result_count(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            clarify_delay_ms: default_clarify_delay_ms(),
            min_query_chars: default_min_query_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ChatConfig {
    #[must_use]
    pub fn clarify_delay(&self) -> Duration {
        Duration::from_millis(self.clarify_delay_ms)
    }
}

impl WeatherChatConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WEATHERCHAT_CHAT__CLARIFY_DELAY_MS=0
        builder = builder.add_source(
            Environment::with_prefix("WEATHERCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherChatConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherchat").join("config.toml"))
    }

    /// Apply default values to fields left blank by a config source
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.language.is_empty() {
            self.geocoding.language = default_geocoding_language();
        }
        if self.geocoding.result_count == 0 {
            self.geocoding.result_count = default_geocoding_result_count();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.result_count > 100 {
            return Err(
                WeatherChatError::config("Geocoding result count cannot exceed 100").into(),
            );
        }

        if self.chat.clarify_delay_ms > 10_000 {
            return Err(WeatherChatError::config(
                "Clarification delay cannot exceed 10000 ms",
            )
            .into());
        }

        if self.chat.min_query_chars == 0 {
            return Err(
                WeatherChatError::config("Minimum query length must be at least 1").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherChatError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherChatError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Weather", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherChatError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WeatherChatConfig::default();
        assert_eq!(
            config.geocoding.base_url,
            "https://geocoding-api.open-meteo.com/v1"
        );
        assert_eq!(config.geocoding.result_count, 1);
        assert_eq!(config.geocoding.language, "en");
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.chat.clarify_delay(), Duration::from_millis(500));
        assert_eq!(config.chat.min_query_chars, 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.http.user_agent.starts_with("WeatherChat/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherChatConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherChatConfig::default();
        config.chat.clarify_delay_ms = 60_000;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("delay cannot exceed")
        );
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = WeatherChatConfig::default();
        config.weather.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Weather API base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = WeatherChatConfig::default();
        config.geocoding.base_url.clear();
        config.geocoding.result_count = 0;
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(
            config.geocoding.base_url,
            "https://geocoding-api.open-meteo.com/v1"
        );
        assert_eq!(config.geocoding.result_count, 1);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[chat]\nclarify_delay_ms = 0\n\n[server]\nport = 9090\n\n[geocoding]\nlanguage = \"de\""
        )
        .unwrap();

        let config = WeatherChatConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.chat.clarify_delay_ms, 0);
        assert_eq!(config.chat.min_query_chars, 2);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.geocoding.language, "de");
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nformat = \"xml\"").unwrap();

        let result = WeatherChatConfig::load_from_path(Some(file.path().to_path_buf()));
        assert!(result.unwrap_err().to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherChatConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weatherchat"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
