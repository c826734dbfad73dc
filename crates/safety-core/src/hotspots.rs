//! Tourist hotspot detection
//!
//! Hotspots are recomputed from scratch from the latest known position of
//! every tourist. Only positions from the last [`RECENT_WINDOW_MINUTES`]
//! count, and a cluster needs [`MIN_CLUSTER_SIZE`] tourists within
//! [`CLUSTER_RADIUS_KM`] of the tourist that seeded it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::geo::{haversine_km, GeoPoint};
use crate::{Result, SafetyError};

pub const RECENT_WINDOW_MINUTES: i64 = 30;
pub const CLUSTER_RADIUS_KM: f64 = 0.5;
pub const MIN_CLUSTER_SIZE: usize = 3;
pub const HOTSPOT_RADIUS_M: u32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouristLocation {
    pub user_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotMember {
    pub name: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub tourist_count: usize,
    pub tourists: Vec<HotspotMember>,
    pub created_at: DateTime<Utc>,
    /// metres
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined { tourist_count: usize },
    AlreadyJoined,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyTourist {
    pub id: String,
    pub name: String,
    pub distance_km: f64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct HotspotDetector {
    // Insertion order keeps clustering deterministic
    order: Vec<String>,
    locations: HashMap<String, TouristLocation>,
    hotspots: Vec<Hotspot>,
}

impl HotspotDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a tourist's latest position and re-run detection
    pub fn update_location(
        &mut self,
        user_id: &str,
        name: &str,
        lat: f64,
        lng: f64,
        now: DateTime<Utc>,
    ) -> Result<&[Hotspot]> {
        let point = GeoPoint::new(lat, lng)?;

        if !self.locations.contains_key(user_id) {
            self.order.push(user_id.to_string());
        }
        self.locations.insert(
            user_id.to_string(),
            TouristLocation {
                user_id: user_id.to_string(),
                name: name.to_string(),
                lat: point.lat,
                lng: point.lng,
                timestamp: now,
            },
        );

        Ok(self.detect(now))
    }

    fn recent_locations(&self, now: DateTime<Utc>) -> Vec<&TouristLocation> {
        let cutoff = Duration::minutes(RECENT_WINDOW_MINUTES);
        self.order
            .iter()
            .filter_map(|id| self.locations.get(id))
            .filter(|loc| now - loc.timestamp < cutoff)
            .collect()
    }

    /// Re-cluster recent positions. Positions older than the recent window are
    /// forgotten here, so a periodic call bounds the tracked set.
    pub fn detect(&mut self, now: DateTime<Utc>) -> &[Hotspot] {
        self.evict_stale(now);
        self.hotspots = self.cluster(now);
        debug!(
            tourists = self.locations.len(),
            hotspots = self.hotspots.len(),
            "hotspot detection complete"
        );
        &self.hotspots
    }

    fn evict_stale(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = Duration::minutes(RECENT_WINDOW_MINUTES);
        let before = self.locations.len();
        self.locations.retain(|_, loc| now - loc.timestamp < cutoff);
        let locations = &self.locations;
        self.order.retain(|id| locations.contains_key(id));

        let evicted = before - self.locations.len();
        if evicted > 0 {
            debug!(evicted, "stale tourist locations dropped");
        }
        evicted
    }

    fn cluster(&self, now: DateTime<Utc>) -> Vec<Hotspot> {
        let locations = self.recent_locations(now);
        if locations.len() < MIN_CLUSTER_SIZE {
            return Vec::new();
        }

        let mut clusters = Vec::new();
        let mut processed: HashSet<&str> = HashSet::new();

        for seed in &locations {
            if processed.contains(seed.user_id.as_str()) {
                continue;
            }
            processed.insert(&seed.user_id);

            let mut members = vec![*seed];
            for other in &locations {
                if processed.contains(other.user_id.as_str()) {
                    continue;
                }
                if haversine_km(seed.lat, seed.lng, other.lat, other.lng) <= CLUSTER_RADIUS_KM {
                    members.push(*other);
                    processed.insert(&other.user_id);
                }
            }

            if members.len() >= MIN_CLUSTER_SIZE {
                let n = members.len() as f64;
                clusters.push(Hotspot {
                    id: format!("hotspot_{}", clusters.len() + 1),
                    lat: members.iter().map(|m| m.lat).sum::<f64>() / n,
                    lng: members.iter().map(|m| m.lng).sum::<f64>() / n,
                    tourist_count: members.len(),
                    tourists: members
                        .iter()
                        .map(|m| HotspotMember {
                            name: m.name.clone(),
                            user_id: m.user_id.clone(),
                        })
                        .collect(),
                    created_at: now,
                    radius: HOTSPOT_RADIUS_M,
                });
            }
        }

        clusters
    }

    pub fn all(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn get(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    pub fn join(&mut self, id: &str, user_id: &str, name: &str) -> Result<JoinOutcome> {
        let hotspot = self
            .hotspots
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| SafetyError::HotspotNotFound(id.to_string()))?;

        if hotspot.tourists.iter().any(|t| t.user_id == user_id) {
            return Ok(JoinOutcome::AlreadyJoined);
        }

        hotspot.tourists.push(HotspotMember {
            name: name.to_string(),
            user_id: user_id.to_string(),
        });
        hotspot.tourist_count = hotspot.tourists.len();
        Ok(JoinOutcome::Joined {
            tourist_count: hotspot.tourist_count,
        })
    }

    pub fn tourist_count(&self) -> usize {
        self.locations.len()
    }

    /// Recent tourists within `radius_km`, nearest first
    pub fn nearby_tourists(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
        exclude_user: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<NearbyTourist> {
        let mut nearby: Vec<NearbyTourist> = self
            .recent_locations(now)
            .into_iter()
            .filter(|loc| Some(loc.user_id.as_str()) != exclude_user)
            .map(|loc| NearbyTourist {
                id: loc.user_id.clone(),
                name: loc.name.clone(),
                distance_km: haversine_km(lat, lng, loc.lat, loc.lng),
                last_seen: loc.timestamp,
            })
            .filter(|t| t.distance_km <= radius_km)
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby
    }
}
