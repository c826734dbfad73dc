//! Safety ratings, the alert feed, SOS and the dashboard

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use safety_core::{
    ratings::DEFAULT_RADIUS_KM, AlertKind, AlertRecord, BehaviorSummary, NearbySummary, RatingGroup, SafetyError,
    SafetyHeatmap,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub const ALERT_FEED_LEN: usize = 10;
pub const DASHBOARD_ALERTS_LEN: usize = 5;

pub fn rating_router() -> Router<AppState> {
    Router::new()
        .route("/api/ratings", get(get_ratings).post(add_rating))
        .route("/api/alerts", get(get_alerts))
        .route("/api/sos", post(sos_alert))
        .route("/api/dashboard", get(dashboard))
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewRating {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<u8>,
}

pub async fn add_rating(State(state): State<AppState>, ApiJson(req): ApiJson<NewRating>) -> ApiResult<Json<SuccessResponse>> {
    let lat = req.lat.ok_or(SafetyError::MissingField("lat"))?;
    let lng = req.lng.ok_or(SafetyError::MissingField("lng"))?;
    let rating = req.rating.ok_or(SafetyError::MissingField("rating"))?;

    state.ratings.write().await.add(lat, lng, rating)?;
    info!(lat, lng, rating, "safety rating added");
    Ok(Json(SuccessResponse::ok()))
}

#[derive(Debug, Deserialize)]
pub struct RatingsQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RatingsResponse {
    Nearby(NearbySummary),
    Grouped(Vec<RatingGroup>),
}

/// Nearby summary when a location is given, otherwise every proximity group
pub async fn get_ratings(State(state): State<AppState>, ApiQuery(query): ApiQuery<RatingsQuery>) -> ApiResult<Json<RatingsResponse>> {
    let ratings = state.ratings.read().await;

    let response = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => {
            let radius = query.radius.unwrap_or(DEFAULT_RADIUS_KM);
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ApiError::BadRequest(format!("Invalid radius: {}", radius)));
            }
            RatingsResponse::Nearby(ratings.nearby(lat, lng, radius)?)
        }
        _ => RatingsResponse::Grouped(ratings.grouped()),
    };

    Ok(Json(response))
}

pub async fn get_alerts(State(state): State<AppState>) -> Json<Vec<AlertRecord>> {
    Json(state.alerts.read().await.recent(ALERT_FEED_LEN))
}

#[derive(Debug, Default, Deserialize)]
pub struct SosRequest {
    #[serde(default)]
    pub location: Option<serde_json::Value>,
    #[serde(default)]
    pub user_id: Option<String>,
}

pub async fn sos_alert(State(state): State<AppState>, body: Option<Json<SosRequest>>) -> Json<SuccessResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let location = req
        .location
        .unwrap_or_else(|| serde_json::Value::String("Unknown".to_string()));

    tracing::warn!(user_id = ?req.user_id, %location, "SOS triggered");
    state
        .log_alert(
            AlertKind::Sos,
            "SOS Emergency triggered",
            serde_json::json!({ "location": location, "user_id": req.user_id }),
        )
        .await;

    Json(SuccessResponse::with_message(true, "SOS alert sent"))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub active_tourists: usize,
    pub recent_alerts: Vec<AlertRecord>,
    pub safety_heatmap: SafetyHeatmap,
    pub behavior_analysis: BehaviorSummary,
    pub active_tracking_sessions: usize,
    pub tracked_tourists: usize,
    pub hotspots: usize,
}

pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    // One lock at a time, in a fixed order
    let active_tourists = state.identity.read().await.verified_count();
    let recent_alerts = state.alerts.read().await.recent(DASHBOARD_ALERTS_LEN);
    let safety_heatmap = state.ratings.read().await.heatmap();
    let behavior_analysis = state.behavior.read().await.summary();
    let active_tracking_sessions = state.tracking.read().await.active_count();
    let (tracked_tourists, hotspots) = {
        let detector = state.hotspots.read().await;
        (detector.tourist_count(), detector.all().len())
    };

    Json(DashboardResponse {
        active_tourists,
        recent_alerts,
        safety_heatmap,
        behavior_analysis,
        active_tracking_sessions,
        tracked_tourists,
        hotspots,
    })
}
