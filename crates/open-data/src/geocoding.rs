//! Nominatim (OpenStreetMap) geocoding

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{get_json, http_client, OpenDataError, Result, DEFAULT_USER_AGENT};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying agent
    pub user_agent: String,
    pub timeout_sec: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_sec: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}

impl TryFrom<SearchHit> for Place {
    type Error = OpenDataError;

    fn try_from(hit: SearchHit) -> Result<Self> {
        let parse = |field: &str, value: &str| {
            value
                .parse::<f64>()
                .map_err(|e| OpenDataError::ParseError(format!("{} {:?}: {}", field, value, e)))
        };
        Ok(Self {
            lat: parse("lat", &hit.lat)?,
            lng: parse("lon", &hit.lon)?,
            display_name: hit.display_name,
        })
    }
}

pub struct Geocoder {
    config: GeocoderConfig,
    client: reqwest::Client,
}

impl Geocoder {
    pub fn nominatim() -> Result<Self> {
        Self::new(GeocoderConfig::default())
    }

    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = http_client(config.timeout_sec, &config.user_agent)?;
        Ok(Self { config, client })
    }

    /// Best match for a free-text query
    pub async fn search(&self, query: &str) -> Result<Place> {
        let request = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&[("format", "json"), ("q", query), ("limit", "1")]);
        let hits: Vec<SearchHit> = get_json(request, "Nominatim").await?;

        let place = hits
            .into_iter()
            .next()
            .ok_or_else(|| OpenDataError::NotFound(query.to_string()))
            .and_then(Place::try_from)?;
        debug!(query, lat = place.lat, lng = place.lng, "geocoded");
        Ok(place)
    }

    /// Display name for a coordinate
    pub async fn reverse(&self, lat: f64, lng: f64) -> Result<String> {
        let request = self.client.get(format!("{}/reverse", self.config.base_url)).query(&[
            ("format", "json".to_string()),
            ("lat", lat.to_string()),
            ("lon", lng.to_string()),
        ]);
        let hit: ReverseHit = get_json(request, "Nominatim").await?;
        hit.display_name
            .ok_or_else(|| OpenDataError::NotFound(format!("{}, {}", lat, lng)))
    }
}
