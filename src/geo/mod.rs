//! Geographic value types
//!
//! Positions, markers and the "lon,lat" text form used by every external
//! service this crate talks to.

pub mod marker;

pub use marker::{DisplaySize, IconKind, Marker};

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Create a new position
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates are present (finite)
    pub fn is_resolvable(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.is_resolvable() {
            return Err(Error::InvalidCoordinates(format!(
                "({}, {}) is not a finite position",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Render as the "lon,lat" pair the web services expect
    pub fn to_lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a "lon,lat" pair
    fn from_str(s: &str) -> Result<Self> {
        let position = parse_lon_lat(s).ok_or_else(|| {
            Error::InvalidCoordinates(format!("Expected \"lon,lat\", got {:?}", s))
        })?;
        position.validate()?;
        Ok(position)
    }
}

/// Parse a single "lon,lat" vertex
///
/// Returns None unless there are exactly two finite numbers.
pub fn parse_lon_lat(text: &str) -> Option<Position> {
    let mut parts = text.split(',');
    let lng: f64 = parts.next()?.trim().parse().ok()?;
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let position = Position::new(lat, lng);
    position.is_resolvable().then_some(position)
}

/// Calculate the distance between two positions in meters (Haversine formula)
pub fn haversine_distance(p1: Position, p2: Position) -> f64 {
    let lat1 = p1.latitude * PI / 180.0;
    let lat2 = p2.latitude * PI / 180.0;
    let delta_lat = (p2.latitude - p1.latitude) * PI / 180.0;
    let delta_lng = (p2.longitude - p1.longitude) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_lon_lat() {
        let position = parse_lon_lat("115.868517,28.742945").unwrap();
        assert_eq!(position.longitude, 115.868517);
        assert_eq!(position.latitude, 28.742945);
    }

    #[test]
    fn test_parse_lon_lat_tolerates_spaces() {
        let position = parse_lon_lat(" 1.5 , 2.5 ").unwrap();
        assert_eq!(position, Position::new(2.5, 1.5));
    }

    #[test]
    fn test_parse_lon_lat_rejects_malformed() {
        assert!(parse_lon_lat("").is_none());
        assert!(parse_lon_lat("1.0").is_none());
        assert!(parse_lon_lat("1.0,abc").is_none());
        assert!(parse_lon_lat("1.0,2.0,3.0").is_none());
        assert!(parse_lon_lat("NaN,2.0").is_none());
    }

    #[test]
    fn test_from_str_validates_range() {
        assert!("116.4,39.9".parse::<Position>().is_ok());
        assert!("116.4,91.0".parse::<Position>().is_err());
        assert!("nonsense".parse::<Position>().is_err());
    }

    #[test]
    fn test_lon_lat_text() {
        let position = Position::new(28.742945, 115.868517);
        assert_eq!(position.to_lon_lat(), "115.868517,28.742945");
        assert_eq!(parse_lon_lat(&position.to_lon_lat()), Some(position));
    }

    #[test]
    fn test_resolvable() {
        assert!(Position::new(0.0, 0.0).is_resolvable());
        assert!(!Position::new(f64::NAN, 0.0).is_resolvable());
        assert!(!Position::new(0.0, f64::INFINITY).is_resolvable());
    }

    #[test]
    fn test_haversine_distance() {
        let a = Position::new(40.7128, -74.0060);
        let b = Position::new(41.7128, -74.0060);

        // One degree of latitude is roughly 111 km
        assert_relative_eq!(haversine_distance(a, b), 111_195.0, max_relative = 0.01);
        assert_eq!(haversine_distance(a, a), 0.0);
    }
}
