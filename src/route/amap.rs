//! AMap driving route backend (`/v3/direction/driving`)

use crate::constants::api::{AMAP_DRIVING_PATH, AMAP_STATUS_OK};
use crate::error::{Error, Result, RouteFailure};
use crate::geo::Position;
use crate::lenient;
use crate::route::{route_from_paths, RawPath, Route, RoutePlanner};
use serde::Deserialize;
use tracing::debug;

/// AMap driving route backend
#[derive(Debug, Clone)]
pub struct AmapRoutePlanner {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

/// Driving response envelope
#[derive(Debug, Deserialize)]
struct DrivingResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    status: String,
    #[serde(default, deserialize_with = "lenient::text")]
    info: String,
    route: Option<DrivingRoute>,
}

#[derive(Debug, Deserialize)]
struct DrivingRoute {
    #[serde(default)]
    paths: Vec<RawPath>,
}

impl AmapRoutePlanner {
    /// Create a new AMap route planner
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            key: key.into(),
        }
    }
}

impl RoutePlanner for AmapRoutePlanner {
    async fn plan_driving_route(&self, origin: Position, destination: Position) -> Result<Route> {
        let url = format!(
            "{}{}?origin={}&destination={}&extensions=base&key={}",
            self.base_url,
            AMAP_DRIVING_PATH,
            origin.to_lon_lat(),
            destination.to_lon_lat(),
            urlencoding::encode(&self.key)
        );
        debug!("Planning driving route {} -> {}", origin, destination);

        let response = self.client.get(&url).send().await.map_err(|e| {
            Error::Route(RouteFailure::Service(format!("AMap request failed: {}", e)))
        })?;

        if !response.status().is_success() {
            return Err(Error::Route(RouteFailure::Service(format!(
                "AMap returned status: {}",
                response.status()
            ))));
        }

        let body: DrivingResponse = response.json().await.map_err(|e| {
            Error::Route(RouteFailure::Service(format!(
                "Failed to parse AMap response: {}",
                e
            )))
        })?;

        route_from_driving(body)
    }
}

fn route_from_driving(body: DrivingResponse) -> Result<Route> {
    if body.status != AMAP_STATUS_OK {
        return Err(Error::Route(RouteFailure::Service(format!(
            "AMap rejected the request: {}",
            body.info
        ))));
    }

    route_from_paths(body.route.map(|r| r.paths).unwrap_or_default())
}
