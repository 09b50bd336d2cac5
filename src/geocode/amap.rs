//! AMap geocoding backend
//!
//! Reverse geocoding via `/v3/geocode/regeo`, place search via
//! `/v3/assistant/inputtips`.

use crate::constants::api::{AMAP_INPUT_TIPS_PATH, AMAP_REGEO_PATH, AMAP_STATUS_OK};
use crate::error::{Error, Result};
use crate::geo::{parse_lon_lat, Position};
use crate::geocode::{normalize_query, Geocoder, PlaceCandidate, PlaceDescription};
use crate::lenient;
use serde::Deserialize;
use tracing::debug;

/// AMap geocoding backend
#[derive(Debug, Clone)]
pub struct AmapGeocoder {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

/// Reverse geocoding response
#[derive(Debug, Deserialize)]
struct RegeoResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    status: String,
    #[serde(default, deserialize_with = "lenient::text")]
    info: String,
    regeocode: Option<Regeocode>,
}

#[derive(Debug, Deserialize)]
struct Regeocode {
    #[serde(default, deserialize_with = "lenient::text")]
    formatted_address: String,
    #[serde(default)]
    pois: Vec<Poi>,
}

#[derive(Debug, Deserialize)]
struct Poi {
    #[serde(default, deserialize_with = "lenient::text")]
    name: String,
}

/// Input tips response
#[derive(Debug, Deserialize)]
struct TipsResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    status: String,
    #[serde(default, deserialize_with = "lenient::text")]
    info: String,
    #[serde(default)]
    tips: Vec<Tip>,
}

#[derive(Debug, Deserialize)]
struct Tip {
    #[serde(default, deserialize_with = "lenient::text")]
    name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    district: String,
    #[serde(default, deserialize_with = "lenient::text")]
    location: String,
}

impl AmapGeocoder {
    /// Create a new AMap geocoder
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            key: key.into(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Geocode(format!("AMap request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocode(format!(
                "AMap returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Geocode(format!("Failed to parse AMap response: {}", e)))
    }
}

impl Geocoder for AmapGeocoder {
    async fn reverse_geocode(&self, position: Position) -> Result<PlaceDescription> {
        let url = format!(
            "{}{}?location={}&extensions=all&key={}",
            self.base_url,
            AMAP_REGEO_PATH,
            position.to_lon_lat(),
            urlencoding::encode(&self.key)
        );

        let response: RegeoResponse = self.get_json(&url).await?;
        place_from_regeo(response)
    }

    async fn search_places(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let query = normalize_query(query)?;
        let url = format!(
            "{}{}?keywords={}&key={}",
            self.base_url,
            AMAP_INPUT_TIPS_PATH,
            urlencoding::encode(query),
            urlencoding::encode(&self.key)
        );

        let response: TipsResponse = self.get_json(&url).await?;
        candidates_from_tips(query, response)
    }
}

fn check_status(status: &str, info: &str) -> Result<()> {
    if status == AMAP_STATUS_OK {
        Ok(())
    } else {
        Err(Error::Geocode(format!("AMap rejected the request: {}", info)))
    }
}

/// Name is the nearest POI, falling back to the formatted address
fn place_from_regeo(response: RegeoResponse) -> Result<PlaceDescription> {
    check_status(&response.status, &response.info)?;

    let regeocode = response
        .regeocode
        .ok_or_else(|| Error::Geocode("No address for this location".to_string()))?;

    let address = regeocode.formatted_address;
    let name = regeocode
        .pois
        .into_iter()
        .map(|poi| poi.name)
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| address.clone());

    if name.is_empty() {
        return Err(Error::Geocode("No address for this location".to_string()));
    }

    Ok(PlaceDescription {
        name,
        description: address,
    })
}

/// Tips without a usable location (bus lines, categories) are skipped
fn candidates_from_tips(query: &str, response: TipsResponse) -> Result<Vec<PlaceCandidate>> {
    check_status(&response.status, &response.info)?;

    let candidates: Vec<PlaceCandidate> = response
        .tips
        .into_iter()
        .filter_map(|tip| {
            let Some(position) = parse_lon_lat(&tip.location) else {
                debug!("Skipping tip without location: {}", tip.name);
                return None;
            };
            Some(PlaceCandidate {
                name: format!("{}{}", tip.district, tip.name),
                position,
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(Error::Geocode(format!("No places matched '{}'", query)));
    }

    Ok(candidates)
}
