//! Live tracking sessions
//!
//! Each position fix is checked against low-safety zones and the risk model.
//! Resulting events land in the alert log and are pushed to any SSE
//! subscribers of that session.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::Stream;
use safety_core::{PositionSample, RiskAssessment, SafetyError, TrackingEvent, TrackingSession};
use serde::{Deserialize, Serialize};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{debug, warn};

use crate::behavior_routes::{local_hour, ANONYMOUS_NAME, ANONYMOUS_USER};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn tracking_router() -> Router<AppState> {
    Router::new()
        .route("/api/tracking/start", post(start_tracking))
        .route("/api/tracking/:id", get(tracking_status))
        .route("/api/tracking/:id/stop", post(stop_tracking))
        .route("/api/tracking/:id/position", post(submit_position))
        .route("/api/tracking/:id/events", get(tracking_events))
}

/// SSE event name, matching the `event` tag of the JSON payload
pub fn event_name(event: &TrackingEvent) -> &'static str {
    match event {
        TrackingEvent::SafetyZone { .. } => "safety_zone",
        TrackingEvent::PredictiveAlert { .. } => "predictive_alert",
        TrackingEvent::Stopped { .. } => "stopped",
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
}

pub async fn start_tracking(
    State(state): State<AppState>,
    body: Option<Json<StartRequest>>,
) -> Json<TrackingSession> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let user_id = req.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
    let name = req.name.as_deref().unwrap_or(ANONYMOUS_NAME);

    let session = state.tracking.write().await.start(user_id, name, Utc::now()).clone();
    Json(session)
}

pub async fn stop_tracking(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<TrackingSession>> {
    let (session, event) = {
        let mut tracking = state.tracking.write().await;
        let (session, event) = tracking.stop(&id, Utc::now())?;
        (session.clone(), event)
    };

    if let Some(event) = event {
        state.publish(&[event]).await;
    }
    Ok(Json(session))
}

pub async fn tracking_status(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<TrackingSession>> {
    let session = state.tracking.read().await.status(&id)?.clone();
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Tourist's local hour; the server clock is used when absent
    pub hour: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub session_id: String,
    pub events: Vec<TrackingEvent>,
    pub assessment: Option<RiskAssessment>,
}

pub async fn submit_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PositionRequest>,
) -> ApiResult<Json<PositionResponse>> {
    let lat = req.lat.ok_or(SafetyError::MissingField("lat"))?;
    let lng = req.lng.ok_or(SafetyError::MissingField("lng"))?;
    let hour = req.hour.unwrap_or_else(local_hour);
    if hour > 23 {
        return Err(ApiError::BadRequest(format!("Invalid hour: {}", hour)));
    }
    let sample = PositionSample::new(lat, lng, Utc::now());

    let zones = state.ratings.read().await.grouped();

    let (events, user_id, name, assessment) = {
        let mut tracking = state.tracking.write().await;
        let events = tracking.ingest(&id, sample, &zones, hour)?;
        let session = tracking.status(&id)?;
        (
            events,
            session.user_id.clone(),
            session.name.clone(),
            session.last_assessment.clone(),
        )
    };

    state.record_position(&user_id, &name, sample).await?;
    state.publish(&events).await;

    Ok(Json(PositionResponse {
        session_id: id,
        events,
        assessment,
    }))
}

/// Server-sent events for one session. Slow subscribers skip what they missed.
pub async fn tracking_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    state.tracking.read().await.status(&id)?;
    debug!(session = %id, "SSE subscriber attached");

    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |msg| match msg {
        Ok(event) if event.session_id() == id => Some(Event::default().event(event_name(&event)).json_data(&event)),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(session = %id, skipped, "SSE subscriber lagged");
            None
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
