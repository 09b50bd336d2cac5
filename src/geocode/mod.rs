//! Geocoding adapter
//!
//! Reverse geocoding (coordinates to display text) and place search
//! (keywords to candidate positions) behind one success/failure contract.

pub mod amap;

use crate::error::{Error, Result};
use crate::geo::Position;
use serde::{Deserialize, Serialize};

/// Human-readable text for a coordinate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub name: String,
    pub description: String,
}

/// A place search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub position: Position,
}

/// Trait for geocoding backends
pub trait Geocoder: Send + Sync {
    /// Describe a coordinate
    fn reverse_geocode(
        &self,
        position: Position,
    ) -> impl std::future::Future<Output = Result<PlaceDescription>> + Send;

    /// Search places by keywords, best match first
    ///
    /// An empty result is an error, never an empty list.
    fn search_places(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PlaceCandidate>>> + Send;
}

/// Trim a search query, rejecting blank input before it costs a request
pub fn normalize_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::Geocode("search query is empty".to_string()));
    }
    Ok(trimmed)
}
