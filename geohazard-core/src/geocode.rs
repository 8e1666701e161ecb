//! Forward and reverse geocoding against a Nominatim-compatible service
//!
//! An empty search result is a normal outcome (`Ok(vec![])`), as is a reverse
//! lookup with no match (`Ok(None)`). Only transport failures, HTTP errors and
//! malformed bodies are errors; callers report them and carry on.

use crate::config::GeocoderSettings;
use crate::location::Coordinate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Geocoding failure
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// Request could not be sent or the body could not be read
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("geocoding service returned HTTP {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("malformed geocoding response: {0}")]
    Parse(String),
}

/// Search candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub coordinates: Coordinate,
}

/// Geocoding capability consumed by the controllers
pub trait Geocoder {
    /// Candidates for a free-text query, best match first
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError>;

    /// Display name for a coordinate, None when nothing is there
    fn reverse(&self, coordinates: Coordinate) -> Result<Option<String>, GeocodeError>;
}

// Nominatim encodes coordinates as strings
#[derive(Deserialize)]
struct RawPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Deserialize)]
struct RawReverse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn parse_degrees(value: &str, field: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::Parse(format!("invalid {} '{}'", field, value)))
}

/// Parse a `/search?format=json` body
pub fn parse_search_response(body: &str) -> Result<Vec<Place>, GeocodeError> {
    let raw: Vec<RawPlace> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    raw.into_iter()
        .map(|p| {
            Ok(Place {
                coordinates: Coordinate::new(
                    parse_degrees(&p.lat, "lat")?,
                    parse_degrees(&p.lon, "lon")?,
                ),
                display_name: p.display_name,
            })
        })
        .collect()
}

/// Parse a `/reverse?format=json` body
pub fn parse_reverse_response(body: &str) -> Result<Option<String>, GeocodeError> {
    let raw: RawReverse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    if let Some(error) = raw.error {
        tracing::debug!(%error, "reverse geocoding found nothing");
        return Ok(None);
    }
    Ok(raw.display_name.filter(|name| !name.trim().is_empty()))
}

/// Blocking Nominatim client
pub struct NominatimClient {
    client: reqwest::blocking::Client,
    base_url: String,
    limit: usize,
    country_codes: Vec<String>,
}

impl NominatimClient {
    pub fn new(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(NominatimClient {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            limit: settings.limit,
            country_codes: settings.country_codes.clone(),
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, GeocodeError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, ?query, "geocoding request");

        let response = self.client.get(&url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }
}

impl Geocoder for NominatimClient {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = vec![
            ("format", "json".to_string()),
            ("q", query.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.country_codes.is_empty() {
            params.push(("countrycodes", self.country_codes.join(",")));
        }

        let body = self.get("search", &params)?;
        parse_search_response(&body)
    }

    fn reverse(&self, coordinates: Coordinate) -> Result<Option<String>, GeocodeError> {
        let params = [
            ("format", "json".to_string()),
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
        ];
        let body = self.get("reverse", &params)?;
        parse_reverse_response(&body)
    }
}
