//! Movement history, risk analysis, hotspots and the tourist community

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, Timelike, Utc};
use safety_core::{
    Hotspot, JoinOutcome, MovementPatterns, NearbyTourist, PositionSample, RiskAssessment, SafetyError,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::geo_routes::CoordQuery;
use crate::rating_routes::SuccessResponse;
use crate::state::AppState;

pub const ANONYMOUS_USER: &str = "anonymous";
pub const ANONYMOUS_NAME: &str = "Anonymous Tourist";
pub const COMMUNITY_RADIUS_KM: f64 = 2.0;

pub fn behavior_router() -> Router<AppState> {
    Router::new()
        .route("/api/behavior", post(record_behavior))
        .route("/api/behavior/:user_id/analysis", get(behavior_analysis))
        .route("/api/hotspots", get(list_hotspots))
        .route("/api/hotspots/:id", get(get_hotspot))
        .route("/api/hotspots/join/:id", post(join_hotspot))
        .route("/api/tourist-community", get(tourist_community))
}

pub fn local_hour() -> u32 {
    Local::now().hour()
}

#[derive(Debug, Deserialize)]
pub struct BehaviorUpdate {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub async fn record_behavior(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BehaviorUpdate>,
) -> ApiResult<Json<SuccessResponse>> {
    let lat = req.lat.ok_or(SafetyError::MissingField("lat"))?;
    let lng = req.lng.ok_or(SafetyError::MissingField("lng"))?;
    let user_id = req.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
    let name = req.name.as_deref().unwrap_or(ANONYMOUS_NAME);

    state
        .record_position(user_id, name, PositionSample::new(lat, lng, Utc::now()))
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    /// Tourist's local hour; the server clock is used when absent
    pub hour: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BehaviorAnalysis {
    pub user_id: String,
    pub samples: usize,
    pub patterns: Option<MovementPatterns>,
    pub assessment: Option<RiskAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn behavior_analysis(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiQuery(query): ApiQuery<AnalysisQuery>,
) -> ApiResult<Json<BehaviorAnalysis>> {
    let hour = query.hour.unwrap_or_else(local_hour);
    if hour > 23 {
        return Err(ApiError::BadRequest(format!("Invalid hour: {}", hour)));
    }

    let model = state.tracking.read().await.config().risk_model.clone();
    let behavior = state.behavior.read().await;
    let window = behavior
        .window(&user_id)
        .ok_or_else(|| ApiError::NotFound(format!("No movement history for {}", user_id)))?;

    let patterns = window.detect_patterns();
    let assessment = patterns.as_ref().map(|p| model.assess(p, hour));
    let message = patterns
        .is_none()
        .then(|| "Not enough movement data for analysis".to_string());

    Ok(Json(BehaviorAnalysis {
        samples: window.len(),
        user_id,
        patterns,
        assessment,
        message,
    }))
}

#[derive(Debug, Serialize)]
pub struct HotspotList {
    pub hotspots: Vec<Hotspot>,
}

pub async fn list_hotspots(State(state): State<AppState>) -> Json<HotspotList> {
    Json(HotspotList {
        hotspots: state.hotspots.read().await.all().to_vec(),
    })
}

pub async fn get_hotspot(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Hotspot>> {
    state
        .hotspots
        .read()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| SafetyError::HotspotNotFound(id).into())
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
}

pub async fn join_hotspot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<JoinRequest>>,
) -> ApiResult<Json<SuccessResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let user_id = req.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
    let name = req.name.as_deref().unwrap_or(ANONYMOUS_NAME);

    let outcome = state.hotspots.write().await.join(&id, user_id, name)?;
    let response = match outcome {
        JoinOutcome::Joined { tourist_count } => {
            tracing::info!(hotspot = %id, user_id, tourist_count, "joined hotspot");
            SuccessResponse::with_message(true, format!("Joined hotspot with {} tourists!", tourist_count))
        }
        JoinOutcome::AlreadyJoined => SuccessResponse::with_message(false, "Already joined this hotspot"),
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct CommunityQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommunityResponse {
    pub tourists: Vec<NearbyTourist>,
    pub radius_km: f64,
}

pub async fn tourist_community(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CommunityQuery>,
) -> ApiResult<Json<CommunityResponse>> {
    let point = CoordQuery {
        lat: query.lat,
        lng: query.lng,
    }
    .point()?;
    let radius_km = query.radius.unwrap_or(COMMUNITY_RADIUS_KM);

    let tourists = state.hotspots.read().await.nearby_tourists(
        point.lat,
        point.lng,
        radius_km,
        query.user_id.as_deref(),
        Utc::now(),
    );

    Ok(Json(CommunityResponse { tourists, radius_km }))
}
