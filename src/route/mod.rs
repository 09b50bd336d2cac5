//! Route adapter
//!
//! Normalizes a driving-route answer into ordered steps, aggregate stats and
//! one flattened polyline.

pub mod amap;

use crate::error::{Error, Result, RouteFailure};
use crate::geo::{parse_lon_lat, Position};
use crate::lenient;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One leg of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub polyline: Vec<Position>,
}

/// A planned driving route
///
/// `steps` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub steps: Vec<RouteStep>,
    pub traffic_light_count: u32,
}

impl Route {
    /// Sum of step distances
    pub fn total_distance_meters(&self) -> f64 {
        self.steps.iter().map(|s| s.distance_meters).sum()
    }

    /// Sum of step durations
    pub fn total_duration_seconds(&self) -> f64 {
        self.steps.iter().map(|s| s.duration_seconds).sum()
    }

    /// All step polylines concatenated in order
    pub fn flattened_polyline(&self) -> Vec<Position> {
        self.steps
            .iter()
            .flat_map(|s| s.polyline.iter().copied())
            .collect()
    }
}

/// Trait for driving-route backends
pub trait RoutePlanner: Send + Sync {
    /// Plan a driving route between two resolvable positions
    fn plan_driving_route(
        &self,
        origin: Position,
        destination: Position,
    ) -> impl std::future::Future<Output = Result<Route>> + Send;
}

/// A path as routing services describe it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPath {
    #[serde(default)]
    pub steps: Vec<RawStep>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub traffic_lights: u32,
}

/// A step as routing services describe it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStep {
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub polyline: String,
}

/// Parse "lon,lat;lon,lat;..." into positions
///
/// Malformed vertices are skipped one by one.
pub fn parse_polyline(text: &str) -> Vec<Position> {
    text.split(';')
        .filter(|vertex| !vertex.trim().is_empty())
        .filter_map(|vertex| {
            let position = parse_lon_lat(vertex);
            if position.is_none() {
                debug!("Skipping malformed polyline vertex: {:?}", vertex);
            }
            position
        })
        .collect()
}

impl From<RawStep> for RouteStep {
    fn from(raw: RawStep) -> Self {
        Self {
            distance_meters: raw.distance.max(0.0),
            duration_seconds: raw.duration.max(0.0),
            polyline: parse_polyline(&raw.polyline),
        }
    }
}

/// Build a route from the first path of a routing answer
///
/// No paths, or a first path without steps, is `RouteFailure::NoRoute`.
pub fn route_from_paths(paths: Vec<RawPath>) -> Result<Route> {
    let path = paths
        .into_iter()
        .next()
        .ok_or(Error::Route(RouteFailure::NoRoute))?;

    if path.steps.is_empty() {
        return Err(Error::Route(RouteFailure::NoRoute));
    }

    Ok(Route {
        steps: path.steps.into_iter().map(RouteStep::from).collect(),
        traffic_light_count: path.traffic_lights,
    })
}
