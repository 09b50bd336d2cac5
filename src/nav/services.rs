//! External service bundle
//!
//! The navigator talks to four collaborators. Bundling them behind one trait
//! keeps `Navigator` generic so it can run against scripted services.

use crate::config::Config;
use crate::constants::api::USER_AGENT;
use crate::device::{DeviceTracker, HttpDeviceTracker};
use crate::error::{Error, Result};
use crate::geocode::amap::AmapGeocoder;
use crate::geocode::Geocoder;
use crate::route::amap::AmapRoutePlanner;
use crate::route::RoutePlanner;
use crate::sensor::{ConfiguredSensor, LocationSensor};
use std::time::Duration;

/// The collaborators a navigator depends on
pub trait NavServices: Send + Sync + 'static {
    type Geocoder: Geocoder;
    type Planner: RoutePlanner;
    type Sensor: LocationSensor;
    type Tracker: DeviceTracker;

    fn geocoder(&self) -> &Self::Geocoder;
    fn planner(&self) -> &Self::Planner;
    fn sensor(&self) -> &Self::Sensor;
    fn tracker(&self) -> &Self::Tracker;
}

/// AMap web services plus the configured sensor and device feed
#[derive(Debug)]
pub struct AmapServices {
    geocoder: AmapGeocoder,
    planner: AmapRoutePlanner,
    sensor: ConfiguredSensor,
    tracker: HttpDeviceTracker,
}

impl AmapServices {
    /// Build every backend from configuration
    ///
    /// Fails when no AMap key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config.amap_key().ok_or_else(|| {
            Error::Config(
                "No AMap key configured. Set one with `guide-nav config amap.key <KEY>`"
                    .to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            geocoder: AmapGeocoder::new(client.clone(), &config.amap.base_url, &key),
            planner: AmapRoutePlanner::new(client, &config.amap.base_url, key),
            sensor: ConfiguredSensor::from_config(config)?,
            tracker: HttpDeviceTracker::new(
                &config.device.feed_url,
                Duration::from_secs(config.device.timeout_secs),
            )?,
        })
    }
}

impl NavServices for AmapServices {
    type Geocoder = AmapGeocoder;
    type Planner = AmapRoutePlanner;
    type Sensor = ConfiguredSensor;
    type Tracker = HttpDeviceTracker;

    fn geocoder(&self) -> &AmapGeocoder {
        &self.geocoder
    }

    fn planner(&self) -> &AmapRoutePlanner {
        &self.planner
    }

    fn sensor(&self) -> &ConfiguredSensor {
        &self.sensor
    }

    fn tracker(&self) -> &HttpDeviceTracker {
        &self.tracker
    }
}
