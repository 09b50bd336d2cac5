//! Location sensor
//!
//! Where the user's own position comes from.

pub mod ip_location;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::Position;
use serde::{Deserialize, Serialize};

/// How precise a fix the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyProfile {
    /// Best available (GPS-grade when the source has it)
    #[default]
    Fine,
    /// City-level is good enough
    Coarse,
}

impl std::str::FromStr for AccuracyProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fine" | "high" => Ok(Self::Fine),
            "coarse" | "low" => Ok(Self::Coarse),
            _ => Err(format!("Unknown accuracy profile: {}", s)),
        }
    }
}

/// Trait for position sources
pub trait LocationSensor: Send + Sync {
    /// Current position of the user
    fn current_position(
        &self,
        profile: AccuracyProfile,
    ) -> impl std::future::Future<Output = Result<Position>> + Send;
}

/// Sensor that always reports a configured position
#[derive(Debug, Clone, Default)]
pub struct FixedSensor {
    position: Option<Position>,
}

impl FixedSensor {
    pub fn new(position: Option<Position>) -> Self {
        Self { position }
    }
}

impl LocationSensor for FixedSensor {
    async fn current_position(&self, _profile: AccuracyProfile) -> Result<Position> {
        self.position
            .ok_or_else(|| Error::Sensor("No fixed position configured".to_string()))
    }
}

/// The sensor selected by `sensor.source`
#[derive(Debug)]
pub enum ConfiguredSensor {
    Fixed(FixedSensor),
    Ip(ip_location::IpLocator),
}

impl ConfiguredSensor {
    /// Build the sensor named in the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.sensor.source.as_str() {
            "fixed" => Ok(Self::Fixed(FixedSensor::new(config.fixed_position()?))),
            "ip" => Ok(Self::Ip(ip_location::IpLocator::new())),
            other => Err(Error::Config(format!("Unknown sensor source: {}", other))),
        }
    }
}

impl LocationSensor for ConfiguredSensor {
    async fn current_position(&self, profile: AccuracyProfile) -> Result<Position> {
        match self {
            Self::Fixed(sensor) => sensor.current_position(profile).await,
            Self::Ip(sensor) => sensor.current_position(profile).await,
        }
    }
}
