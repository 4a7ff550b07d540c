use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SKYCACHE_CONFIG";

/// Environment variable overriding `upstream.api_key`.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const PLACEHOLDER_API_KEY: &str = "API_KEY";

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

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream weather provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// OpenWeatherMap API credential
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Endpoint for current conditions
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// Endpoint for the multi-step forecast
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key() -> String {
    PLACEHOLDER_API_KEY.to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_forecast_url() -> String {
    "https://api.openweathermap.org/data/2.5/forecast".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            weather_url: default_weather_url(),
            forecast_url: default_forecast_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached response is served before refetching
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Optional cap on the number of cached responses (unbounded when unset)
    #[serde(default)]
    pub max_entries: Option<usize>,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Load configuration from `$SKYCACHE_CONFIG` or the platform config directory.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
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

    fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.upstream.api_key = key;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.bind_address.parse::<IpAddr>().is_err() {
            result.add_error(
                "server.bind_address",
                format!("Not an IP address: {}", self.server.bind_address),
            );
        }

        self.validate_url(&self.upstream.weather_url, "upstream.weather_url", &mut result);
        self.validate_url(&self.upstream.forecast_url, "upstream.forecast_url", &mut result);

        if self.upstream.timeout_secs == 0 {
            result.add_error("upstream.timeout_secs", "Timeout must be greater than 0");
        }

        let api_key = self.upstream.api_key.trim();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            result.add_warning(
                "upstream.api_key",
                format!("API key not configured - set {} or upstream.api_key", API_KEY_ENV),
            );
        }

        if self.cache.ttl_secs == 0 {
            result.add_warning("cache.ttl_secs", "Caching disabled (0 seconds)");
        }

        if self.cache.max_entries == Some(0) {
            result.add_error("cache.max_entries", "Cache capacity must be greater than 0");
        }

        result
    }

    /// Validate a URL field
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

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_address))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycache");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_matches_upstream_contract() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.max_entries, None);
        assert_eq!(config.upstream.timeout(), Duration::from_secs(5));
        assert!(config.upstream.weather_url.ends_with("/data/2.5/weather"));
        assert!(config.upstream.forecast_url.ends_with("/data/2.5/forecast"));
    }

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Placeholder API key is only a warning
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.iter().any(|w| w.field == "upstream.api_key"));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.upstream.weather_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "upstream.weather_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.upstream.forecast_url = "ftp://example.com/forecast".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.upstream.timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "upstream.timeout_secs"));
    }

    #[test]
    fn test_zero_ttl_is_warning() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "cache.ttl_secs"));
    }

    #[test]
    fn test_zero_capacity_is_error() {
        let mut config = Config::default();
        config.cache.max_entries = Some(0);
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "localhost".to_string();
        assert!(!config.validate().is_valid());
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_api_key_override() {
        let mut config = Config::default();
        config.apply_api_key_override(Some("   ".to_string()));
        assert_eq!(config.upstream.api_key, "API_KEY");

        config.apply_api_key_override(Some("secret".to_string()));
        assert_eq!(config.upstream.api_key, "secret");

        config.apply_api_key_override(None);
        assert_eq!(config.upstream.api_key, "secret");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 60\nmax_entries = 128\n\n[server]\nport = 8080").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, Some(128));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.upstream.timeout_secs, 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\nttl_secs = ").unwrap();
        assert!(Config::load_from(file.path()).is_err());
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
