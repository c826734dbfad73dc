//! Live tracking sessions
//!
//! A session is the server-side half of a tourist's "live tracking" toggle.
//! Every GPS fix pushed into an active session runs two checks:
//!
//! 1. Proximity: the first low-safety zone within [`TrackingConfig::zone_radius_m`]
//!    raises a [`TrackingEvent::SafetyZone`], at most once per cooldown.
//! 2. Behavior: once the window holds enough fixes, the movement patterns are
//!    scored and a high score raises a [`TrackingEvent::PredictiveAlert`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::alerts::AlertKind;
use crate::behavior::{BehaviorWindow, PositionSample};
use crate::geo::{haversine_m, GeoPoint};
use crate::ratings::RatingGroup;
use crate::risk::{RiskAssessment, RiskModel};
use crate::{Result, SafetyError};

pub const DEFAULT_NOTIFICATION_COOLDOWN_SECS: i64 = 30;
pub const DEFAULT_ZONE_RADIUS_M: f64 = 500.0;
pub const DEFAULT_LOW_SAFETY_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub notification_cooldown_secs: i64,
    pub zone_radius_m: f64,
    /// Rating groups averaging below this are low-safety zones
    pub low_safety_threshold: f64,
    pub risk_model: RiskModel,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            notification_cooldown_secs: DEFAULT_NOTIFICATION_COOLDOWN_SECS,
            zone_radius_m: DEFAULT_ZONE_RADIUS_M,
            low_safety_threshold: DEFAULT_LOW_SAFETY_THRESHOLD,
            risk_model: RiskModel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Stopped,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingSession {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub last_notification: Option<DateTime<Utc>>,
    pub samples_seen: u64,
    pub last_position: Option<PositionSample>,
    pub last_assessment: Option<RiskAssessment>,
    #[serde(skip)]
    window: BehaviorWindow,
}

impl TrackingSession {
    fn new(user_id: &str, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            state: SessionState::Active,
            started_at: now,
            stopped_at: None,
            last_notification: None,
            samples_seen: 0,
            last_position: None,
            last_assessment: None,
            window: BehaviorWindow::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Time of the latest fix, or the start time before any fix
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_position.map(|p| p.timestamp).unwrap_or(self.started_at)
    }

    pub fn window(&self) -> &BehaviorWindow {
        &self.window
    }

    fn in_cooldown(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.last_notification
            .map(|last| now - last < cooldown)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackingEvent {
    SafetyZone {
        session_id: String,
        user_id: String,
        zone: RatingGroup,
        distance_m: f64,
        message: String,
        timestamp: DateTime<Utc>,
    },
    PredictiveAlert {
        session_id: String,
        user_id: String,
        assessment: RiskAssessment,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Stopped {
        session_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl TrackingEvent {
    pub fn session_id(&self) -> &str {
        match self {
            Self::SafetyZone { session_id, .. }
            | Self::PredictiveAlert { session_id, .. }
            | Self::Stopped { session_id, .. } => session_id,
        }
    }

    /// Alert log category, if this event belongs on the alert feed
    pub fn alert_kind(&self) -> Option<AlertKind> {
        match self {
            Self::SafetyZone { .. } => Some(AlertKind::SafetyZone),
            Self::PredictiveAlert { .. } => Some(AlertKind::AiPrediction),
            Self::Stopped { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::SafetyZone { message, .. } | Self::PredictiveAlert { message, .. } => Some(message),
            Self::Stopped { .. } => None,
        }
    }
}

pub fn safety_zone_message(zone: &RatingGroup) -> String {
    format!(
        "⚠️ SAFETY ALERT ⚠️\n\nYou have entered a low-safety zone!\nRating: {} stars\nLocation: ({})\n\nPlease be cautious and consider changing your route.",
        zone.rating,
        zone.location().label()
    )
}

pub fn predictive_alert_message(assessment: &RiskAssessment) -> String {
    format!(
        "🤖 AI ALERT: {}\n\nRisk Level: {:.1}%\nPatterns: {}",
        assessment.recommendation,
        assessment.risk_percent(),
        if assessment.patterns.erratic_movement {
            "Erratic movement"
        } else {
            "Normal"
        }
    )
}

#[derive(Debug, Default)]
pub struct TrackingRegistry {
    config: TrackingConfig,
    sessions: HashMap<String, TrackingSession>,
}

impl TrackingRegistry {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Start tracking for a user, reusing their active session if one exists
    pub fn start(&mut self, user_id: &str, name: &str, now: DateTime<Utc>) -> &TrackingSession {
        let existing = self
            .sessions
            .values()
            .find(|s| s.user_id == user_id && s.is_active())
            .map(|s| s.id.clone());

        let id = match existing {
            Some(id) => {
                debug!(session = %id, user_id, "reusing active tracking session");
                id
            }
            None => {
                let session = TrackingSession::new(user_id, name, now);
                let id = session.id.clone();
                info!(session = %id, user_id, "tracking started");
                self.sessions.insert(id.clone(), session);
                id
            }
        };

        &self.sessions[&id]
    }

    /// Stop a session. Stopping an already stopped session is a no-op.
    pub fn stop(&mut self, session_id: &str, now: DateTime<Utc>) -> Result<(&TrackingSession, Option<TrackingEvent>)> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SafetyError::SessionNotFound(session_id.to_string()))?;

        if !session.is_active() {
            return Ok((&*session, None));
        }

        session.state = SessionState::Stopped;
        session.stopped_at = Some(now);
        info!(session = session_id, samples = session.samples_seen, "tracking stopped");

        let event = TrackingEvent::Stopped {
            session_id: session_id.to_string(),
            timestamp: now,
        };
        Ok((&*session, Some(event)))
    }

    pub fn status(&self, session_id: &str) -> Result<&TrackingSession> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| SafetyError::SessionNotFound(session_id.to_string()))
    }

    /// Feed one GPS fix into an active session.
    ///
    /// `zones` are the current rating groups; only those below the configured
    /// low-safety threshold are considered. `local_hour` is the tourist's
    /// wall-clock hour for the night-time risk factor.
    pub fn ingest(
        &mut self,
        session_id: &str,
        sample: PositionSample,
        zones: &[RatingGroup],
        local_hour: u32,
    ) -> Result<Vec<TrackingEvent>> {
        let point = GeoPoint::new(sample.lat, sample.lng)?;
        let config = &self.config;
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SafetyError::SessionNotFound(session_id.to_string()))?;

        if !session.is_active() {
            return Err(SafetyError::SessionStopped(session_id.to_string()));
        }

        let now = sample.timestamp;
        session.window.push(sample);
        session.samples_seen += 1;
        session.last_position = Some(sample);

        let mut events = Vec::new();

        let cooldown = Duration::seconds(config.notification_cooldown_secs);
        if !session.in_cooldown(now, cooldown) {
            let hit = zones
                .iter()
                .filter(|z| z.rating < config.low_safety_threshold)
                .map(|z| (z, haversine_m(point.lat, point.lng, z.lat, z.lng)))
                .find(|(_, d)| *d < config.zone_radius_m);

            if let Some((zone, distance_m)) = hit {
                session.last_notification = Some(now);
                events.push(TrackingEvent::SafetyZone {
                    session_id: session.id.clone(),
                    user_id: session.user_id.clone(),
                    zone: zone.clone(),
                    distance_m,
                    message: safety_zone_message(zone),
                    timestamp: now,
                });
            }
        }

        if let Some(patterns) = session.window.detect_patterns() {
            let assessment = config.risk_model.assess(&patterns, local_hour);
            if assessment.high_risk {
                events.push(TrackingEvent::PredictiveAlert {
                    session_id: session.id.clone(),
                    user_id: session.user_id.clone(),
                    message: predictive_alert_message(&assessment),
                    assessment: assessment.clone(),
                    timestamp: now,
                });
            }
            session.last_assessment = Some(assessment);
        }

        debug!(session = session_id, events = events.len(), "tracking sample processed");
        Ok(events)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_active()).count()
    }

    /// Stop active sessions with no fix for `idle_for`, returning their stop events
    pub fn expire_idle(&mut self, idle_for: Duration, now: DateTime<Utc>) -> Vec<TrackingEvent> {
        let idle: Vec<String> = self
            .sessions
            .values()
            .filter(|s| s.is_active() && now - s.last_active() >= idle_for)
            .map(|s| s.id.clone())
            .collect();

        idle.iter()
            .filter_map(|id| self.stop(id, now).ok().and_then(|(_, event)| event))
            .collect()
    }

    /// Drop sessions stopped longer than `older_than` ago
    pub fn prune_stopped(&mut self, older_than: Duration, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| match s.stopped_at {
            Some(stopped) => now - stopped < older_than,
            None => true,
        });
        before - self.sessions.len()
    }
}
