//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/guide-nav/config.toml

pub mod defaults;

use crate::constants::api::{AMAP_BASE_URL, AMAP_KEY_ENV};
use crate::error::{Error, Result};
use crate::geo::Position;
use crate::sensor::AccuracyProfile;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// AMap web service settings
    #[serde(default)]
    pub amap: AmapConfig,

    /// Guide stick position feed
    #[serde(default)]
    pub device: DeviceConfig,

    /// Where the user's position comes from
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Map presentation
    #[serde(default)]
    pub map: MapConfig,

    /// Navigation defaults
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// AMap web service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmapConfig {
    /// Web service key
    #[serde(default)]
    pub key: String,

    /// Base URL of the web service
    #[serde(default = "default_amap_base_url")]
    pub base_url: String,
}

/// Guide stick position feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// URL returning the device position as "lon,lat" text
    #[serde(default = "default_device_feed_url")]
    pub feed_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_device_timeout")]
    pub timeout_secs: u64,
}

/// Location sensor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// "ip" or "fixed"
    #[serde(default = "default_sensor_source")]
    pub source: String,

    /// Position reported by the fixed sensor, as "lon,lat"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_position: Option<String>,

    /// "fine" or "coarse"
    #[serde(default = "default_accuracy")]
    pub accuracy: String,
}

/// Map presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Zoom level handed to the map surface
    #[serde(default = "default_scale")]
    pub scale: u8,

    /// Route polyline color
    #[serde(default = "default_route_color")]
    pub route_color: String,

    /// Route polyline width
    #[serde(default = "default_route_width")]
    pub route_width: u32,

    /// Route polyline opacity
    #[serde(default = "default_route_opacity")]
    pub route_opacity: f64,
}

/// Navigation defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Destination preselected at startup, as "lon,lat"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_destination: Option<String>,

    /// Display name of the preselected destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_destination_name: Option<String>,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_amap_base_url() -> String {
    AMAP_BASE_URL.to_string()
}
fn default_device_feed_url() -> String {
    DEFAULT_DEVICE_FEED_URL.to_string()
}
fn default_device_timeout() -> u64 {
    DEFAULT_DEVICE_TIMEOUT_SECS
}
fn default_sensor_source() -> String {
    DEFAULT_SENSOR_SOURCE.to_string()
}
fn default_accuracy() -> String {
    DEFAULT_ACCURACY.to_string()
}
fn default_scale() -> u8 {
    DEFAULT_SCALE
}
fn default_route_color() -> String {
    DEFAULT_ROUTE_COLOR.to_string()
}
fn default_route_width() -> u32 {
    DEFAULT_ROUTE_WIDTH
}
fn default_route_opacity() -> f64 {
    DEFAULT_ROUTE_OPACITY
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: default_amap_base_url(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            feed_url: default_device_feed_url(),
            timeout_secs: default_device_timeout(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: default_sensor_source(),
            fixed_position: None,
            accuracy: default_accuracy(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            route_color: default_route_color(),
            route_width: default_route_width(),
            route_opacity: default_route_opacity(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["amap", "key"] => Some(self.amap.key.clone()),
            ["amap", "base_url"] => Some(self.amap.base_url.clone()),

            ["device", "feed_url"] => Some(self.device.feed_url.clone()),
            ["device", "timeout_secs"] => Some(self.device.timeout_secs.to_string()),

            ["sensor", "source"] => Some(self.sensor.source.clone()),
            ["sensor", "fixed_position"] => {
                Some(self.sensor.fixed_position.clone().unwrap_or_default())
            }
            ["sensor", "accuracy"] => Some(self.sensor.accuracy.clone()),

            ["map", "scale"] => Some(self.map.scale.to_string()),
            ["map", "route_color"] => Some(self.map.route_color.clone()),
            ["map", "route_width"] => Some(self.map.route_width.to_string()),
            ["map", "route_opacity"] => Some(self.map.route_opacity.to_string()),

            ["navigation", "default_destination"] => {
                Some(self.navigation.default_destination.clone().unwrap_or_default())
            }
            ["navigation", "default_destination_name"] => Some(
                self.navigation
                    .default_destination_name
                    .clone()
                    .unwrap_or_default(),
            ),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key". An empty value clears optional keys.
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["amap", "key"] => {
                self.amap.key = value.to_string();
            }
            ["amap", "base_url"] => {
                self.amap.base_url = value.trim_end_matches('/').to_string();
            }

            ["device", "feed_url"] => {
                self.device.feed_url = value.to_string();
            }
            ["device", "timeout_secs"] => {
                self.device.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["sensor", "source"] => match value {
                "ip" | "fixed" => self.sensor.source = value.to_string(),
                _ => {
                    return Err(Error::Config(format!(
                        "Invalid sensor source: {} (expected ip or fixed)",
                        value
                    )))
                }
            },
            ["sensor", "fixed_position"] => {
                self.sensor.fixed_position = optional_position(value)?;
            }
            ["sensor", "accuracy"] => {
                value.parse::<AccuracyProfile>().map_err(Error::Config)?;
                self.sensor.accuracy = value.to_string();
            }

            ["map", "scale"] => {
                self.map.scale = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid scale value: {}", value))
                })?;
            }
            ["map", "route_color"] => {
                self.map.route_color = value.to_string();
            }
            ["map", "route_width"] => {
                self.map.route_width = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid width value: {}", value))
                })?;
            }
            ["map", "route_opacity"] => {
                let opacity: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid opacity value: {}", value))
                })?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(Error::Config(format!(
                        "Opacity {} is out of range [0, 1]",
                        opacity
                    )));
                }
                self.map.route_opacity = opacity;
            }

            ["navigation", "default_destination"] => {
                self.navigation.default_destination = optional_position(value)?;
            }
            ["navigation", "default_destination_name"] => {
                self.navigation.default_destination_name =
                    (!value.is_empty()).then(|| value.to_string());
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "amap.key",
            "amap.base_url",
            "device.feed_url",
            "device.timeout_secs",
            "sensor.source",
            "sensor.fixed_position",
            "sensor.accuracy",
            "map.scale",
            "map.route_color",
            "map.route_width",
            "map.route_opacity",
            "navigation.default_destination",
            "navigation.default_destination_name",
            "server.host",
            "server.port",
        ]
    }

    /// AMap key, preferring the environment override
    pub fn amap_key(&self) -> Option<String> {
        std::env::var(AMAP_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| (!self.amap.key.is_empty()).then(|| self.amap.key.clone()))
    }

    /// Accuracy profile requested from the location sensor
    pub fn accuracy(&self) -> Result<AccuracyProfile> {
        self.sensor.accuracy.parse().map_err(Error::Config)
    }

    /// Configured fixed sensor position, if any
    pub fn fixed_position(&self) -> Result<Option<Position>> {
        self.sensor
            .fixed_position
            .as_deref()
            .map(str::parse::<Position>)
            .transpose()
    }

    /// Configured default destination, if any
    pub fn default_destination(&self) -> Result<Option<Position>> {
        self.navigation
            .default_destination
            .as_deref()
            .map(str::parse::<Position>)
            .transpose()
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Validate an optional "lon,lat" value; empty clears it
fn optional_position(value: &str) -> Result<Option<String>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    let position: Position = value.parse()?;
    Ok(Some(position.to_lon_lat()))
}
