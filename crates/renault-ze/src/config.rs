use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use myrenault_proto::DEFAULT_API_URL;
use serde::Deserialize;
use thiserror::Error;

/// Locale sent at login when none is configured.
pub const DEFAULT_LOCALE: &str = "fr_FR";

/// Longest accepted `scan_interval`, one day.
pub const MAX_SCAN_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for one vehicle sensor.
///
/// ```toml
/// username = "driver@example.com"
/// password = "secret"
/// vin = "VF1AG000X00000000"
/// android_lng = "fr_FR"  # optional
/// name = "Zoe"           # optional, defaults to the VIN
/// ```
#[derive(Clone, Deserialize)]
pub struct SensorConfig {
    pub username: String,
    pub password: String,
    pub vin: String,
    #[serde(default = "default_locale")]
    pub android_lng: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Seconds between two updates.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_scan_interval() -> u64 {
    crate::platform::SCAN_INTERVAL.as_secs()
}

impl SensorConfig {
    /// Read and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("username", &self.username),
            ("password", &self.password),
            ("vin", &self.vin),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".into(),
                });
            }
        }
        if !(1..=MAX_SCAN_INTERVAL_SECS).contains(&self.scan_interval) {
            return Err(ConfigError::Invalid {
                field: "scan_interval",
                reason: format!("must be between 1 and {MAX_SCAN_INTERVAL_SECS} seconds"),
            });
        }
        Ok(())
    }

    /// The configured name, or the VIN when there is none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.vin)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }
}

impl fmt::Debug for SensorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("vin", &self.vin)
            .field("android_lng", &self.android_lng)
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("scan_interval", &self.scan_interval)
            .finish()
    }
}
