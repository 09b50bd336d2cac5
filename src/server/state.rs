//! Server shared state
//!
//! Holds configuration and the navigator shared by every request.

use crate::config::Config;
use crate::error::Result;
use crate::nav::{NavServices, Navigator};
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<S: NavServices> {
    /// Configuration the server was started with
    pub config: Config,

    /// Navigation state and external services
    pub navigator: Navigator<S>,

    started: Instant,
}

impl<S: NavServices> AppState<S> {
    /// Create application state around an existing navigator
    pub fn new(config: Config, navigator: Navigator<S>) -> Self {
        Self {
            config,
            navigator,
            started: Instant::now(),
        }
    }

    /// Build the navigator from configuration
    pub fn from_config(config: Config, services: S) -> Result<Self> {
        let navigator = Navigator::from_config(&config, services)?;
        Ok(Self::new(config, navigator))
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
