//! Tourist Safety Core
//!
//! Domain logic behind the safety portal, free of any I/O:
//! - Location safety ratings and proximity grouping
//! - Tourist hotspot clustering
//! - GPS behavior windows and risk scoring
//! - Live tracking sessions with throttled proximity alerts
//! - Weather classification, assistant replies, language tables
//! - Mock identity (verification codes, sessions, checksum IDs)

use thiserror::Error;

pub mod alerts;
pub mod assistant;
pub mod behavior;
pub mod geo;
pub mod hotspots;
pub mod identity;
pub mod language;
pub mod news;
pub mod ratings;
pub mod risk;
pub mod tracking;
pub mod weather;

pub use alerts::{AlertKind, AlertLog, AlertRecord, ALERT_LOG_CAPACITY};
pub use behavior::{BehaviorHistory, BehaviorSummary, BehaviorWindow, MovementPatterns, PositionSample};
pub use geo::{haversine_km, haversine_m, GeoPoint};
pub use hotspots::{Hotspot, HotspotDetector, JoinOutcome, NearbyTourist, TouristLocation};
pub use identity::{ChecksumVerification, IdentityStore, LoginSession, Registration, UserProfile};
pub use ratings::{NearbySummary, Rating, RatingGroup, RatingStore, SafetyHeatmap};
pub use risk::{RiskAssessment, RiskModel};
pub use tracking::{SessionState, TrackingConfig, TrackingEvent, TrackingRegistry, TrackingSession};
pub use weather::{check_weather_alerts, describe_weather_code, CurrentConditions, WeatherReport};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SafetyError {
    #[error("Invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Hotspot not found: {0}")]
    HotspotNotFound(String),
    #[error("Tracking session not found: {0}")]
    SessionNotFound(String),
    #[error("Tracking session stopped: {0}")]
    SessionStopped(String),
    #[error("User already exists: {0}")]
    UserExists(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Invalid verification code")]
    InvalidVerificationCode,
    #[error("Please verify your email first")]
    EmailNotVerified,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, SafetyError>;

/// Round to one decimal place, the precision ratings and averages are reported at
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
