//! Guide stick position feed
//!
//! The stick publishes its last GPS fix as `lon,lat` plain text over HTTP.

use crate::error::{Error, Result};
use crate::geo::{parse_lon_lat, Position};
use std::time::Duration;

/// Trait for tracked-device position sources
pub trait DeviceTracker: Send + Sync {
    /// Last known position of the device
    fn locate_device(&self) -> impl std::future::Future<Output = Result<Position>> + Send;
}

/// Plain-text HTTP feed
#[derive(Debug, Clone)]
pub struct HttpDeviceTracker {
    client: reqwest::Client,
    feed_url: String,
}

impl HttpDeviceTracker {
    /// Create a tracker polling `feed_url`
    pub fn new(feed_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Device(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            feed_url: feed_url.into(),
        })
    }
}

impl DeviceTracker for HttpDeviceTracker {
    async fn locate_device(&self) -> Result<Position> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| Error::Device(format!("Device feed request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Device(format!(
                "Device feed returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Device(format!("Failed to read device feed: {}", e)))?;

        parse_device_feed(&body)
    }
}

/// Parse the feed body; some firmware builds quote the value
pub fn parse_device_feed(body: &str) -> Result<Position> {
    let text = body.trim().trim_matches('"');
    let position = parse_lon_lat(text)
        .ok_or_else(|| Error::Device(format!("Unreadable device position: {:?}", text)))?;
    position
        .validate()
        .map_err(|e| Error::Device(e.to_string()))?;
    Ok(position)
}
