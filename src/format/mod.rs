//! Status formatter
//!
//! Turns route totals into the two lines of status text shown above the map.

use crate::route::Route;
use serde::{Deserialize, Serialize};

/// Title and subtitle shown above the map
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusText {
    pub title: String,
    pub subtitle: String,
}

impl StatusText {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

/// Format a distance: kilometers with two decimals above 1000 m, else whole meters
pub fn format_distance(meters: f64) -> String {
    if meters > 1000.0 {
        format!("{:.2}km", meters / 1000.0)
    } else {
        format!("{}m", meters.max(0.0).round() as u64)
    }
}

/// Format a duration as its non-zero hour, minute and second parts
///
/// A zero duration renders as an empty string.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{} hour(s)", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{} minute(s)", minutes));
    }
    if secs > 0 {
        out.push_str(&format!("{} second(s)", secs));
    }
    out
}

/// Summarize a route for display
pub fn format_route(route: &Route) -> StatusText {
    StatusText {
        title: format!(
            "Distance to destination {}, estimated time {}",
            format_distance(route.total_distance_meters()),
            format_duration(route.total_duration_seconds())
        ),
        subtitle: format!(
            "{} traffic light(s) along the route",
            route.traffic_light_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Position;
    use crate::route::RouteStep;

    fn route(distance: f64, duration: f64, lights: u32) -> Route {
        Route {
            steps: vec![RouteStep {
                distance_meters: distance,
                duration_seconds: duration,
                polyline: vec![Position::new(28.74, 115.86)],
            }],
            traffic_light_count: lights,
        }
    }

    #[test]
    fn test_distance_meters() {
        assert_eq!(format_distance(500.0), "500m");
        assert_eq!(format_distance(1000.0), "1000m");
        assert_eq!(format_distance(0.0), "0m");
    }

    #[test]
    fn test_distance_kilometers() {
        assert_eq!(format_distance(1500.0), "1.50km");
        assert_eq!(format_distance(12_340.0), "12.34km");
    }

    #[test]
    fn test_duration_all_units() {
        assert_eq!(format_duration(3661.0), "1 hour(s)1 minute(s)1 second(s)");
    }

    #[test]
    fn test_duration_omits_zero_units() {
        assert_eq!(format_duration(3600.0), "1 hour(s)");
        assert_eq!(format_duration(3605.0), "1 hour(s)5 second(s)");
        assert_eq!(format_duration(120.0), "2 minute(s)");
        assert_eq!(format_duration(0.0), "");
    }

    #[test]
    fn test_format_route() {
        let status = format_route(&route(1500.0, 3661.0, 3));
        assert!(status.title.contains("1.50km"));
        assert!(status.title.contains("1 hour(s)1 minute(s)1 second(s)"));
        assert_eq!(status.subtitle, "3 traffic light(s) along the route");
    }

    #[test]
    fn test_format_zero_route() {
        let status = format_route(&route(0.0, 0.0, 0));
        assert!(status.title.contains("0m"));
        assert!(status.title.ends_with("estimated time "));
        assert_eq!(status.subtitle, "0 traffic light(s) along the route");
    }
}
