//! Open data clients
//!
//! Thin async wrappers over the free, keyless services the portal relies on:
//! - Open-Meteo for current weather (with a TTL cache)
//! - Nominatim for forward and reverse geocoding
//! - Wikipedia for place summaries and attraction search

use std::time::Duration;
use thiserror::Error;

pub mod geocoding;
pub mod weather_api;
pub mod wikipedia;

pub use geocoding::{Geocoder, GeocoderConfig, Place};
pub use weather_api::{CurrentWeather, WeatherApi, WeatherApiConfig};
pub use wikipedia::{Attraction, AttractionSource, WikiSummary, Wikipedia, WikipediaConfig};

pub const DEFAULT_USER_AGENT: &str = "Tourist-Safety-Portal/1.0";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpenDataError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, OpenDataError>;

pub(crate) fn http_client(timeout_sec: u64, user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_sec))
        .user_agent(user_agent)
        .build()
        .map_err(|e| OpenDataError::RequestFailed(format!("failed to build HTTP client: {}", e)))
}

/// Send a request and decode a JSON body, mapping failures onto [`OpenDataError`]
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &str,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| OpenDataError::RequestFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(OpenDataError::ApiError(format!(
            "{} returned status: {}",
            service,
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| OpenDataError::ParseError(e.to_string()))
}
