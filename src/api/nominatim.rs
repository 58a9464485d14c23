use serde::Deserialize;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use super::USER_AGENT;
use crate::config::NominatimConfig;
use crate::domain::Coordinate;
use crate::error::SearchError;

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize, Default)]
struct ReverseResult {
    #[serde(default)]
    address: HashMap<String, String>,
}

/// State and country of a reverse-geocoded point; empty when unknown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub state: String,
    pub country: String,
}

impl Region {
    fn from_address(address: &HashMap<String, String>) -> Self {
        let state = address
            .get("state")
            .or_else(|| address.get("province"))
            .or_else(|| address.get("state_district"))
            .cloned()
            .unwrap_or_default();
        let country = address.get("country").cloned().unwrap_or_default();
        Self { state, country }
    }
}

fn client() -> Result<reqwest::blocking::Client, SearchError> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| SearchError::Geocoder(format!("failed to create HTTP client: {}", e)))
}

/// Geocode a US city to latitude/longitude.
///
/// `location` is free text such as `"Miami, Florida, USA"`; results are
/// restricted to the United States. Includes a 1 second delay for rate
/// limiting (Nominatim ToS).
pub fn geocode_city(config: &NominatimConfig, location: &str) -> Result<Coordinate, SearchError> {
    // Rate limiting - Nominatim requires max 1 request per second
    thread::sleep(Duration::from_secs(1));

    let response = client()?
        .get(&config.search_url)
        .query(&[
            ("q", location),
            ("format", "jsonv2"),
            ("countrycodes", "us"),
            ("limit", "1"),
        ])
        .send()
        .map_err(|e| SearchError::Geocoder(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SearchError::Geocoder(format!(
            "Nominatim returned error status: {}",
            response.status()
        )));
    }

    let results: Vec<NominatimResult> = response
        .json()
        .map_err(|e| SearchError::Geocoder(format!("failed to parse response: {}", e)))?;

    first_coordinate(results, location)
}

fn first_coordinate(results: Vec<NominatimResult>, location: &str) -> Result<Coordinate, SearchError> {
    let result = results
        .into_iter()
        .next()
        .ok_or_else(|| SearchError::LocationNotFound(location.to_string()))?;

    let lat: f64 = result
        .lat
        .parse()
        .map_err(|_| SearchError::Geocoder(format!("bad latitude for {}", result.display_name)))?;
    let lon: f64 = result
        .lon
        .parse()
        .map_err(|_| SearchError::Geocoder(format!("bad longitude for {}", result.display_name)))?;

    Ok(Coordinate::new(lat, lon))
}

/// Look up the state and country containing a point.
///
/// Failures are not fatal: any error yields an empty `Region`.
pub fn reverse_geocode(config: &NominatimConfig, point: Coordinate) -> Region {
    thread::sleep(Duration::from_secs(1));

    let Ok(client) = client() else {
        return Region::default();
    };

    let lat = point.lat.to_string();
    let lon = point.lon.to_string();
    let response = client
        .get(&config.reverse_url)
        .query(&[
            ("format", "jsonv2"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("accept-language", "en"),
        ])
        .send();

    match response {
        Ok(r) if r.status().is_success() => r
            .json::<ReverseResult>()
            .map(|result| Region::from_address(&result.address))
            .unwrap_or_default(),
        _ => Region::default(),
    }
}
