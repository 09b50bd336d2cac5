//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default device tracker feed URL
pub const DEFAULT_DEVICE_FEED_URL: &str = "http://127.0.0.1:64076";

/// Default device feed request timeout in seconds
pub const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 10;

/// Default location sensor source
pub const DEFAULT_SENSOR_SOURCE: &str = "ip";

/// Default accuracy profile requested from the sensor
pub const DEFAULT_ACCURACY: &str = "fine";

/// Default map scale (zoom level)
pub const DEFAULT_SCALE: u8 = 17;

/// Default route polyline color
pub const DEFAULT_ROUTE_COLOR: &str = "#46adf9";

/// Default route polyline width
pub const DEFAULT_ROUTE_WIDTH: u32 = 6;

/// Default route polyline opacity
pub const DEFAULT_ROUTE_OPACITY: f64 = 0.8;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "guide-nav";
