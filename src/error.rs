//! Error types for guide-nav

use thiserror::Error;

/// Main error type for guide-nav operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Location sensor error: {0}")]
    Sensor(String),

    #[error("Geocoding error: {0}")]
    Geocode(String),

    #[error("Route error: {0}")]
    Route(RouteFailure),

    #[error("Missing origin or destination")]
    MissingEndpoint,

    #[error("Device tracker error: {0}")]
    Device(String),

    #[error("Unknown marker: {0}")]
    UnknownMarker(u32),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Why a driving route could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    /// The routing service answered, but found no viable path
    #[error("no driving route found")]
    NoRoute,

    /// The routing service failed or returned something unusable
    #[error("{0}")]
    Service(String),
}

impl Error {
    /// Short machine-readable code, used by the HTTP surface
    pub fn code(&self) -> &'static str {
        match self {
            Error::Sensor(_) => "SENSOR_ERROR",
            Error::Geocode(_) => "GEOCODE_ERROR",
            Error::Route(RouteFailure::NoRoute) => "NO_ROUTE",
            Error::Route(_) => "ROUTE_ERROR",
            Error::MissingEndpoint => "MISSING_ENDPOINT",
            Error::Device(_) => "DEVICE_ERROR",
            Error::UnknownMarker(_) => "UNKNOWN_MARKER",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// True for failures detected locally, before any external call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::MissingEndpoint | Error::UnknownMarker(_) | Error::InvalidCoordinates(_)
        )
    }
}

/// Result type alias for guide-nav operations
pub type Result<T> = std::result::Result<T, Error>;
