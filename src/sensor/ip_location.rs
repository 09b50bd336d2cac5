//! IP-based location sensor
//!
//! Uses ip-api.com for a coarse fix with file-based caching.

use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::error::{Error, Result};
use crate::geo::Position;
use crate::sensor::{AccuracyProfile, LocationSensor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// IP location sensor with caching
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

/// Cached fix
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFix {
    position: Position,
    timestamp: u64,
}

impl IpLocator {
    /// Create a new IP locator with default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir()
            .map(|p| p.join(crate::config::defaults::APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            cache_path,
        }
    }

    /// Create an IP locator with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: Some(cache_path),
        }
    }

    /// Create an IP locator without caching
    pub fn without_cache() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: None,
        }
    }

    /// Fetch a fix from ip-api.com
    async fn fetch_position(&self) -> Result<Position> {
        let response = self
            .client
            .get(IP_API_URL)
            .send()
            .await
            .map_err(|e| Error::Sensor(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Sensor(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Sensor(format!("Failed to parse IP location response: {}", e)))?;

        position_from_response(data)
    }

    /// Load cached fix if still valid
    fn load_cache(&self) -> Option<Position> {
        let cache_path = self.cache_path.as_ref()?;

        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedFix = serde_json::from_str(&content).ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();

        (now.saturating_sub(cached.timestamp) < IP_LOCATION_TTL_SECS).then_some(cached.position)
    }

    /// Save fix to cache
    fn save_cache(&self, position: Position) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let cached = CachedFix { position, timestamp };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }

    /// Get cache duration
    pub fn cache_duration() -> Duration {
        Duration::from_secs(IP_LOCATION_TTL_SECS)
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSensor for IpLocator {
    /// IP lookups are always coarse, whatever profile is asked for
    async fn current_position(&self, profile: AccuracyProfile) -> Result<Position> {
        if profile == AccuracyProfile::Fine {
            debug!("IP sensor only provides coarse fixes");
        }

        if let Some(cached) = self.load_cache() {
            return Ok(cached);
        }

        let position = self.fetch_position().await?;
        self.save_cache(position);
        Ok(position)
    }
}

fn position_from_response(data: IpApiResponse) -> Result<Position> {
    if data.status != "success" {
        return Err(Error::Sensor(format!(
            "IP location lookup failed: {}",
            data.message.unwrap_or_else(|| data.status.clone())
        )));
    }

    let lat = data
        .lat
        .ok_or_else(|| Error::Sensor("No latitude in response".to_string()))?;
    let lng = data
        .lon
        .ok_or_else(|| Error::Sensor("No longitude in response".to_string()))?;

    Ok(Position::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ip_locator_without_cache() {
        let locator = IpLocator::without_cache();
        assert!(locator.cache_path.is_none());
        assert!(locator.load_cache().is_none());
    }

    #[test]
    fn test_cache_operations() {
        let temp_dir = TempDir::new().unwrap();
        let locator = IpLocator::with_cache_path(temp_dir.path().join("fix.json"));

        assert!(locator.load_cache().is_none());

        let position = Position::new(28.68, 115.89);
        locator.save_cache(position);
        assert_eq!(locator.load_cache(), Some(position));

        locator.clear_cache();
        assert!(locator.load_cache().is_none());
    }

    #[test]
    fn test_expired_cache_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fix.json");
        let stale = CachedFix {
            position: Position::new(1.0, 2.0),
            timestamp: 0,
        };
        fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let locator = IpLocator::with_cache_path(path);
        assert!(locator.load_cache().is_none());
    }

    #[tokio::test]
    async fn test_cached_fix_served_without_request() {
        let temp_dir = TempDir::new().unwrap();
        let locator = IpLocator::with_cache_path(temp_dir.path().join("fix.json"));
        let position = Position::new(28.68, 115.89);
        locator.save_cache(position);

        let fix = locator.current_position(AccuracyProfile::Coarse).await.unwrap();
        assert_eq!(fix, position);
    }

    #[test]
    fn test_response_parsing() {
        let ok: IpApiResponse =
            serde_json::from_str(r#"{"status":"success","lat":28.68,"lon":115.89}"#).unwrap();
        assert_eq!(position_from_response(ok).unwrap(), Position::new(28.68, 115.89));

        let failed: IpApiResponse =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        match position_from_response(failed) {
            Err(Error::Sensor(reason)) => assert!(reason.contains("private range")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cache_duration() {
        assert_eq!(IpLocator::cache_duration().as_secs(), 3600);
    }
}
