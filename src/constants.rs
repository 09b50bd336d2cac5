//! Centralized constants for the guide-nav crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
}

/// External API endpoints
pub mod api {
    /// AMap web service base URL
    pub const AMAP_BASE_URL: &str = "https://restapi.amap.com";

    /// Reverse geocoding path (relative to the AMap base URL)
    pub const AMAP_REGEO_PATH: &str = "/v3/geocode/regeo";

    /// Input tips (place search) path
    pub const AMAP_INPUT_TIPS_PATH: &str = "/v3/assistant/inputtips";

    /// Driving route planning path
    pub const AMAP_DRIVING_PATH: &str = "/v3/direction/driving";

    /// AMap reports success with this status value
    pub const AMAP_STATUS_OK: &str = "1";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Environment variable that overrides the configured AMap key
    pub const AMAP_KEY_ENV: &str = "GUIDE_NAV_AMAP_KEY";

    /// User agent sent to web services
    pub const USER_AGENT: &str = concat!("guide-nav/", env!("CARGO_PKG_VERSION"));
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

/// Marker presentation
pub mod marker {
    /// Side length of a destination marker, in display units
    pub const DESTINATION_SIZE: u32 = 35;

    /// Side length of every other marker
    pub const DEFAULT_SIZE: u32 = 30;

    /// Display name of the guide stick marker
    pub const DEVICE_NAME: &str = "Guide stick";

    /// Status text title shown for the user's own position
    pub const ORIGIN_LABEL: &str = "My location";
}
