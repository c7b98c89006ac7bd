//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `zonekit.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use zonekit_adapter_ble::BleConfig;
use zonekit_adapter_http::HttpConfig;
use zonekit_adapter_virtual::VirtualConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Which sensing capabilities feed the engine.
    pub monitoring: MonitoringConfig,
    /// Zone definition source.
    pub zones: ZonesConfig,
    /// Offline zone-set cache.
    pub cache: CacheConfig,
    /// Outbound HTTP settings (callbacks, definition fetch).
    pub http: HttpConfig,
    /// Real beacon scanning.
    pub ble: BleSection,
    /// Simulated sources for running without hardware.
    #[serde(rename = "virtual")]
    pub virtual_sources: VirtualConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Monitoring scope toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Feed GPS location samples into the engine.
    pub gps: bool,
    /// Feed beacon proximity samples into the engine.
    pub beacon: bool,
}

/// Where zone definitions come from.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    /// URL returning the zone definition set as JSON. When unset, a local
    /// demo zone is monitored instead.
    pub url: Option<String>,
}

/// Offline cache for the fetched zone set.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Persist fetched zone sets for offline reloads.
    pub enabled: bool,
    /// Cache file location.
    pub path: String,
}

/// BLE scanning section: the adapter config plus an enable toggle.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BleSection {
    /// Scan for real iBeacons. Off by default: most development machines
    /// have no beacons in range.
    pub enabled: bool,
    #[serde(flatten)]
    pub config: BleConfig,
}

impl Config {
    /// Load configuration from `zonekit.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("zonekit.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ZONEKIT_ZONES_URL") {
            self.zones.url = Some(val);
        }
        if let Ok(val) = std::env::var("ZONEKIT_CACHE_PATH") {
            self.cache.path = val;
        }
        if let Ok(val) = std::env::var("ZONEKIT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.enabled && self.cache.path.is_empty() {
            return Err(ConfigError::Validation(
                "cache.path must not be empty when the cache is enabled".to_string(),
            ));
        }
        if self.virtual_sources.enabled && self.virtual_sources.interval_secs <= 0.0 {
            return Err(ConfigError::Validation(
                "virtual.interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "zonekitd=info,zonekit=info".to_string(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            gps: true,
            beacon: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "zonekit-cache.json".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
