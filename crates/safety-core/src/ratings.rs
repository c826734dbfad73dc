//! Location safety ratings (1-5 stars)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{haversine_km, GeoPoint};
use crate::{round1, Result, SafetyError};

/// Default search radius for nearby summaries (km)
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Ratings within this distance of a group anchor join that group (km)
pub const GROUP_RADIUS_KM: f64 = 5.0;

/// Ratings below this are counted as low-safety on the heatmap
pub const LOW_SAFETY_BELOW: u8 = 3;

/// Ratings at or above this are counted as high-safety on the heatmap
pub const HIGH_SAFETY_FROM: u8 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub lat: f64,
    pub lng: f64,
    pub rating: u8,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingGroup {
    pub lat: f64,
    pub lng: f64,
    /// Average of `ratings`, one decimal
    pub rating: f64,
    pub count: usize,
    pub ratings: Vec<u8>,
}

impl RatingGroup {
    pub fn location(&self) -> GeoPoint {
        GeoPoint { lat: self.lat, lng: self.lng }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbySummary {
    pub average_rating: Option<f64>,
    pub total_ratings: usize,
    pub location: GeoPoint,
    pub radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyHeatmap {
    pub average_rating: f64,
    pub low_safety_zones: usize,
    pub high_safety_zones: usize,
    pub total_rated: usize,
}

#[derive(Debug, Default)]
pub struct RatingStore {
    ratings: Vec<Rating>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, lat: f64, lng: f64, rating: u8) -> Result<&Rating> {
        self.add_at(lat, lng, rating, Utc::now())
    }

    pub fn add_at(&mut self, lat: f64, lng: f64, rating: u8, timestamp: DateTime<Utc>) -> Result<&Rating> {
        let point = GeoPoint::new(lat, lng)?;
        if !(1..=5).contains(&rating) {
            return Err(SafetyError::InvalidRating(rating));
        }

        self.ratings.push(Rating {
            lat: point.lat,
            lng: point.lng,
            rating,
            timestamp,
        });
        debug!(lat, lng, rating, total = self.ratings.len(), "rating stored");
        Ok(&self.ratings[self.ratings.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn all(&self) -> &[Rating] {
        &self.ratings
    }

    /// Average of every rating within `radius_km` (inclusive) of a point
    pub fn nearby(&self, lat: f64, lng: f64, radius_km: f64) -> Result<NearbySummary> {
        let location = GeoPoint::new(lat, lng)?;

        let nearby: Vec<u8> = self
            .ratings
            .iter()
            .filter(|r| haversine_km(lat, lng, r.lat, r.lng) <= radius_km)
            .map(|r| r.rating)
            .collect();

        if nearby.is_empty() {
            return Ok(NearbySummary {
                average_rating: None,
                total_ratings: 0,
                location,
                radius_km,
                message: Some("No ratings found in this area".to_string()),
            });
        }

        let sum: u32 = nearby.iter().map(|&r| r as u32).sum();
        Ok(NearbySummary {
            average_rating: Some(round1(sum as f64 / nearby.len() as f64)),
            total_ratings: nearby.len(),
            location,
            radius_km,
            message: None,
        })
    }

    /// Greedy proximity grouping for map display.
    ///
    /// Each rating joins the first group whose anchor lies within
    /// [`GROUP_RADIUS_KM`]; otherwise it anchors a new group. Anchors never move.
    pub fn grouped(&self) -> Vec<RatingGroup> {
        let mut groups: Vec<RatingGroup> = Vec::new();

        for rating in &self.ratings {
            let existing = groups
                .iter_mut()
                .find(|g| haversine_km(rating.lat, rating.lng, g.lat, g.lng) <= GROUP_RADIUS_KM);

            match existing {
                Some(group) => {
                    group.ratings.push(rating.rating);
                    group.count = group.ratings.len();
                    let sum: u32 = group.ratings.iter().map(|&r| r as u32).sum();
                    group.rating = round1(sum as f64 / group.count as f64);
                }
                None => groups.push(RatingGroup {
                    lat: rating.lat,
                    lng: rating.lng,
                    rating: rating.rating as f64,
                    count: 1,
                    ratings: vec![rating.rating],
                }),
            }
        }

        groups
    }

    /// Groups whose average rating is strictly below `threshold`
    pub fn low_safety_zones(&self, threshold: f64) -> Vec<RatingGroup> {
        self.grouped()
            .into_iter()
            .filter(|g| g.rating < threshold)
            .collect()
    }

    pub fn heatmap(&self) -> SafetyHeatmap {
        if self.ratings.is_empty() {
            return SafetyHeatmap {
                average_rating: 0.0,
                low_safety_zones: 0,
                high_safety_zones: 0,
                total_rated: 0,
            };
        }

        let sum: u32 = self.ratings.iter().map(|r| r.rating as u32).sum();
        SafetyHeatmap {
            average_rating: round1(sum as f64 / self.ratings.len() as f64),
            low_safety_zones: self.ratings.iter().filter(|r| r.rating < LOW_SAFETY_BELOW).count(),
            high_safety_zones: self.ratings.iter().filter(|r| r.rating >= HIGH_SAFETY_FROM).count(),
            total_rated: self.ratings.len(),
        }
    }
}
