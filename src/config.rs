//! Configuration management for `TravelAI` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelAiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TravelAI` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelAiConfig {
    /// Geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Itinerary generation (LLM) configuration
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Location pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Embedded storage for trip history and the geocode cache
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geocoding service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim-compatible search service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Client identification sent with every request
    #[serde(default = "default_geocoding_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,
    /// Minimum spacing between outgoing requests
    #[serde(default = "default_geocoding_interval")]
    pub min_request_interval_ms: u64,
    /// How long resolved places stay in the cache
    #[serde(default = "default_geocoding_cache_ttl")]
    pub cache_ttl_hours: u32,
}

/// Itinerary generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API key for the completion service (falls back to `GROQ_API_KEY`)
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// Upper bound on generated tokens
    #[serde(default = "default_generation_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum geocoder calls in flight per extraction run
    #[serde(default = "default_pipeline_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the embedded database
    #[serde(default = "default_storage_location")]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_server_request_timeout")]
    pub request_timeout_seconds: u32,
    #[serde(default = "default_server_body_limit")]
    pub body_limit_kb: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoding_user_agent() -> String {
    "TravelAI-App/1.0".to_string()
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_geocoding_interval() -> u64 {
    1000
}

fn default_geocoding_cache_ttl() -> u32 {
    168
}

fn default_generation_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_generation_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_generation_max_tokens() -> u32 {
    4000
}

fn default_generation_timeout() -> u32 {
    60
}

fn default_pipeline_concurrency() -> usize {
    1
}

fn default_storage_location() -> String {
    "~/.cache/travelai".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_request_timeout() -> u32 {
    120
}

fn default_server_body_limit() -> u32 {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_geocoding_user_agent(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: 0,
            min_request_interval_ms: default_geocoding_interval(),
            cache_ttl_hours: default_geocoding_cache_ttl(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            max_tokens: default_generation_max_tokens(),
            timeout_seconds: default_generation_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_pipeline_concurrency(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            request_timeout_seconds: default_server_request_timeout(),
            body_limit_kb: default_server_body_limit(),
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

impl GenerationConfig {
    /// The configured key, or `GROQ_API_KEY` from the environment
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GROQ_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl StorageConfig {
    /// Storage location with a leading `~` expanded to the home directory
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.location)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl TravelAiConfig {
    /// Load configuration from `config_path` (or the default location) and the environment
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

        // TRAVELAI_GEOCODING__USER_AGENT -> geocoding.user_agent
        builder = builder.add_source(
            Environment::with_prefix("TRAVELAI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelAiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelai").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_geocoding_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.geocoding.cache_ttl_hours == 0 {
            self.geocoding.cache_ttl_hours = default_geocoding_cache_ttl();
        }
        if self.generation.base_url.is_empty() {
            self.generation.base_url = default_generation_base_url();
        }
        if self.generation.model.is_empty() {
            self.generation.model = default_generation_model();
        }
        if self.generation.max_tokens == 0 {
            self.generation.max_tokens = default_generation_max_tokens();
        }
        if self.generation.timeout_seconds == 0 {
            self.generation.timeout_seconds = default_generation_timeout();
        }
        if self.pipeline.concurrency == 0 {
            self.pipeline.concurrency = default_pipeline_concurrency();
        }
        if self.storage.location.is_empty() {
            self.storage.location = default_storage_location();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // A missing key is only fatal once generation is requested
        if let Some(api_key) = &self.generation.api_key {
            if api_key.is_empty() {
                return Err(TravelAiError::config(
                    "Generation API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(TravelAiError::config(
                    "Generation API key appears to be invalid (too short). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds > 300 {
            return Err(TravelAiError::config(
                "Geocoding timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.geocoding.max_retries > 10 {
            return Err(TravelAiError::config(
                "Geocoding max retries cannot exceed 10"
            ).into());
        }

        if self.geocoding.cache_ttl_hours > 24 * 90 {
            return Err(TravelAiError::config(
                "Geocode cache TTL cannot exceed 2160 hours (90 days)"
            ).into());
        }

        if self.generation.max_tokens > 32_768 {
            return Err(TravelAiError::config(
                "Generation max tokens cannot exceed 32768"
            ).into());
        }

        if self.pipeline.concurrency > 16 {
            return Err(TravelAiError::config(
                "Pipeline concurrency cannot exceed 16"
            ).into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelAiError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelAiError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Generation", &self.generation.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelAiError::config(
                    format!("{name} base URL must be a valid HTTP or HTTPS URL")
                ).into());
            }
        }

        if self.geocoding.user_agent.trim().is_empty() {
            return Err(TravelAiError::config(
                "Geocoding user agent must identify the application"
            ).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TravelAiConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoding.user_agent, "TravelAI-App/1.0");
        assert_eq!(config.geocoding.max_retries, 0);
        assert_eq!(config.generation.model, "llama3-70b-8192");
        assert_eq!(config.generation.max_tokens, 4000);
        assert_eq!(config.pipeline.concurrency, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.generation.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = TravelAiConfig::default();
        config.generation.api_key = Some("short".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TravelAiConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TravelAiConfig::default();
        config.geocoding.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url_scheme() {
        let mut config = TravelAiConfig::default();
        config.geocoding.base_url = "nominatim.local".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Geocoding base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_zero_values() {
        let mut config = TravelAiConfig::default();
        config.pipeline.concurrency = 0;
        config.geocoding.user_agent = String::new();
        config.apply_defaults();
        assert_eq!(config.pipeline.concurrency, 1);
        assert_eq!(config.geocoding.user_agent, "TravelAI-App/1.0");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("travelai-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[geocoding]\nmin_request_interval_ms = 0\n\n[pipeline]\nconcurrency = 4\n",
        )
        .unwrap();

        let config = TravelAiConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.geocoding.min_request_interval_ms, 0);
        assert_eq!(config.pipeline.concurrency, 4);
        assert_eq!(config.geocoding.timeout_seconds, 10);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_storage_path_expands_home() {
        let storage = StorageConfig {
            location: "/var/lib/travelai".to_string(),
        };
        assert_eq!(storage.resolved_path(), PathBuf::from("/var/lib/travelai"));

        if let Some(home) = dirs::home_dir() {
            let storage = StorageConfig::default();
            assert_eq!(storage.resolved_path(), home.join(".cache/travelai"));
        }
    }

    #[test]
    fn test_config_path_generation() {
        let path = TravelAiConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("travelai"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
