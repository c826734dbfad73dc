//! Shared application state

use std::sync::Arc;

use chrono::Utc;
use open_data::{Geocoder, GeocoderConfig, WeatherApi, WeatherApiConfig, Wikipedia, WikipediaConfig};
use safety_core::{
    AlertKind, AlertLog, BehaviorHistory, HotspotDetector, IdentityStore, PositionSample, RatingStore,
    TrackingConfig, TrackingEvent, TrackingRegistry,
};
use tokio::sync::{broadcast, RwLock};

use crate::config::GatewayConfig;

/// Buffered tracking events per subscriber before it starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub ratings: Arc<RwLock<RatingStore>>,
    pub alerts: Arc<RwLock<AlertLog>>,
    pub behavior: Arc<RwLock<BehaviorHistory>>,
    pub hotspots: Arc<RwLock<HotspotDetector>>,
    pub identity: Arc<RwLock<IdentityStore>>,
    pub tracking: Arc<RwLock<TrackingRegistry>>,
    pub events: broadcast::Sender<TrackingEvent>,
    pub weather: Arc<WeatherApi>,
    pub geocoder: Arc<Geocoder>,
    pub wikipedia: Arc<Wikipedia>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> open_data::Result<Self> {
        let weather = WeatherApi::new(WeatherApiConfig {
            cache_ttl_sec: config.weather_cache_ttl_secs,
            timeout_sec: config.http_timeout_secs,
            user_agent: config.user_agent.clone(),
            ..WeatherApiConfig::default()
        })?;
        let geocoder = Geocoder::new(GeocoderConfig {
            user_agent: config.user_agent.clone(),
            timeout_sec: config.http_timeout_secs,
            ..GeocoderConfig::default()
        })?;
        let wikipedia = Wikipedia::new(WikipediaConfig {
            user_agent: config.user_agent.clone(),
            timeout_sec: config.http_timeout_secs.min(5),
            ..WikipediaConfig::default()
        })?;

        let tracking = TrackingRegistry::new(TrackingConfig {
            notification_cooldown_secs: config.notification_cooldown_secs,
            ..TrackingConfig::default()
        });
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            ratings: Arc::new(RwLock::new(RatingStore::new())),
            alerts: Arc::new(RwLock::new(AlertLog::new())),
            behavior: Arc::new(RwLock::new(BehaviorHistory::new())),
            hotspots: Arc::new(RwLock::new(HotspotDetector::new())),
            identity: Arc::new(RwLock::new(IdentityStore::new())),
            tracking: Arc::new(RwLock::new(tracking)),
            events,
            weather: Arc::new(weather),
            geocoder: Arc::new(geocoder),
            wikipedia: Arc::new(wikipedia),
        })
    }

    /// Feed one fix into the behavior history and hotspot detector
    pub async fn record_position(&self, user_id: &str, name: &str, sample: PositionSample) -> safety_core::Result<()> {
        self.hotspots
            .write()
            .await
            .update_location(user_id, name, sample.lat, sample.lng, Utc::now())?;
        self.behavior.write().await.record(user_id, sample);
        Ok(())
    }

    /// Log tracking events and fan them out to SSE subscribers
    pub async fn publish(&self, events: &[TrackingEvent]) {
        if events.is_empty() {
            return;
        }

        {
            let mut alerts = self.alerts.write().await;
            for event in events {
                if let (Some(kind), Some(message)) = (event.alert_kind(), event.message()) {
                    let data = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
                    alerts.log(kind, message, data);
                }
            }
        }

        for event in events {
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }
    }

    pub async fn log_alert(&self, kind: AlertKind, message: impl Into<String>, data: serde_json::Value) {
        self.alerts.write().await.log(kind, message, data);
    }
}
