//! Weather, place search and attraction routes backed by open data services
//!
//! Upstream calls never run under a store lock; the alert log is only touched
//! once the weather response is in hand.

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use open_data::{Attraction, WikiSummary};
use safety_core::{AlertKind, CurrentConditions, GeoPoint, WeatherReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::state::AppState;

pub fn geo_router() -> Router<AppState> {
    Router::new()
        .route("/api/weather", get(get_weather))
        .route("/api/search", get(search_location))
        .route("/api/reverse-geocode", get(reverse_geocode))
        .route("/api/tourist-attractions", get(tourist_attractions))
}

/// `?lat=..&lng=..`, both required
#[derive(Debug, Default, Deserialize)]
pub struct CoordQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CoordQuery {
    pub fn point(&self) -> ApiResult<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(GeoPoint::new(lat, lng)?),
            _ => Err(ApiError::BadRequest("Latitude and longitude required".to_string())),
        }
    }
}

pub async fn get_weather(State(state): State<AppState>, ApiQuery(query): ApiQuery<CoordQuery>) -> ApiResult<Json<WeatherReport>> {
    let point = query.point()?;
    let current = state.weather.fetch_current(point.lat, point.lng).await?;

    let conditions = CurrentConditions {
        temperature: current.temperature,
        apparent_temperature: current.apparent_temperature,
        relative_humidity: current.relative_humidity,
        precipitation: current.precipitation,
        weather_code: current.weather_code,
        wind_speed: current.wind_speed,
    };
    let location = GeoPoint {
        lat: current.latitude,
        lng: current.longitude,
    };
    let report = WeatherReport::from_current(location, &conditions);

    if report.has_alerts() {
        debug!(coordinates = %report.coordinates, alerts = report.alerts.len(), "weather alerts raised");
        state
            .log_alert(
                AlertKind::WeatherAlert,
                format!("Weather alerts at {}", report.coordinates),
                serde_json::json!({ "alerts": report.alerts, "weather": report }),
            )
            .await;
    }

    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikipedia: Option<WikiSummary>,
}

pub async fn search_location(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Search query required".to_string()));
    }

    let place = state.geocoder.search(q).await.map_err(|e| match e {
        open_data::OpenDataError::NotFound(_) => ApiError::NotFound("Location not found".to_string()),
        other => other.into(),
    })?;

    let wikipedia = match state.wikipedia.summary(q).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(query = q, error = %e, "wikipedia lookup failed");
            None
        }
    };

    Ok(Json(SearchResponse {
        lat: place.lat,
        lng: place.lng,
        display_name: place.display_name,
        wikipedia,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReverseGeocodeResponse {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Never fails on upstream errors; falls back to the raw coordinates
pub async fn reverse_geocode(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CoordQuery>,
) -> ApiResult<Json<ReverseGeocodeResponse>> {
    let point = query.point()?;

    let name = match state.geocoder.reverse(point.lat, point.lng).await {
        Ok(name) => name,
        Err(e) => {
            warn!(lat = point.lat, lng = point.lng, error = %e, "reverse geocoding failed");
            fallback_place_name(&point)
        }
    };

    Ok(Json(ReverseGeocodeResponse {
        name,
        lat: point.lat,
        lng: point.lng,
    }))
}

pub fn fallback_place_name(point: &GeoPoint) -> String {
    format!("Location ({:.4}, {:.4})", point.lat, point.lng)
}

#[derive(Debug, Deserialize)]
pub struct AttractionsQuery {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct AttractionsResponse {
    pub attractions: Vec<Attraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn tourist_attractions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AttractionsQuery>,
) -> ApiResult<Json<AttractionsResponse>> {
    let location = query.location.trim();
    if location.is_empty() {
        return Err(ApiError::BadRequest("Location parameter required".to_string()));
    }

    let attractions = state.wikipedia.attractions(location).await;
    let message = attractions
        .is_empty()
        .then(|| "No tourist attractions found".to_string());

    Ok(Json(AttractionsResponse { attractions, message }))
}
