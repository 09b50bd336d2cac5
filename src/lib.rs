//! guide-nav: navigation core for a map client paired with a guide stick
//!
//! Locates the user, searches places, turns a marker or map tap into a
//! destination, plans a driving route and summarizes it, and shows where the
//! guide stick last reported itself. External lookups complete out of order;
//! every result is committed through a request ticket so a superseded
//! completion never overwrites newer state.
//!
//! ## Features
//!
//! - AMap reverse geocoding, place search and driving routes
//! - Fixed or IP-based location sensor
//! - Plain-text guide stick position feed
//! - Marker/view model with viewport points and route overlay
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use guide_nav::nav::NavigationState;
//! use guide_nav::geo::Position;
//!
//! let mut state = NavigationState::default();
//! state.set_user_position(Position::new(28.7429, 115.8685));
//!
//! // No destination yet, so navigation cannot start
//! assert!(state.start_navigation().is_err());
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod format;
pub mod geo;
pub mod geocode;
mod lenient;
pub mod nav;
pub mod route;
pub mod sensor;
pub mod server;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{IconKind, Marker, Position};
pub use nav::{Mode, NavigationState, Navigator};
pub use route::Route;
pub use view::ViewState;
