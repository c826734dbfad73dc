//! GPS behavior windows and movement pattern detection
//!
//! Each tracked tourist keeps a bounded FIFO of recent fixes. Pattern
//! detection looks at the most recent [`PATTERN_SAMPLES`] fixes and derives
//! step distances, average step length and how often the step length jumps.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::geo::haversine_m;
use crate::round1;

/// Samples kept per tourist
pub const WINDOW_CAPACITY: usize = 50;

/// Minimum samples before patterns are reported
pub const MIN_PATTERN_SAMPLES: usize = 5;

/// Trailing samples considered by pattern detection
pub const PATTERN_SAMPLES: usize = 10;

/// Step-length change (m) counted as a speed variation
pub const SPEED_VARIATION_M: f64 = 50.0;

/// Speed variations above this count mark movement as erratic
pub const ERRATIC_VARIATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(lat: f64, lng: f64, timestamp: DateTime<Utc>) -> Self {
        Self { lat, lng, timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPatterns {
    /// Mean step length in metres
    pub avg_speed: f64,
    pub speed_variations: usize,
    /// Sum of step lengths in metres
    pub total_distance: f64,
    pub erratic_movement: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BehaviorWindow {
    samples: VecDeque<PositionSample>,
}

impl BehaviorWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    pub fn push(&mut self, sample: PositionSample) {
        self.samples.push_back(sample);
        while self.samples.len() > WINDOW_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&PositionSample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &PositionSample> {
        self.samples.iter()
    }

    pub fn detect_patterns(&self) -> Option<MovementPatterns> {
        if self.samples.len() < MIN_PATTERN_SAMPLES {
            return None;
        }

        let skip = self.samples.len().saturating_sub(PATTERN_SAMPLES);
        let recent: Vec<&PositionSample> = self.samples.iter().skip(skip).collect();

        let steps: Vec<f64> = recent
            .windows(2)
            .map(|w| haversine_m(w[0].lat, w[0].lng, w[1].lat, w[1].lng))
            .collect();

        let total_distance: f64 = steps.iter().sum();
        let speed_variations = count_speed_variations(&steps);

        Some(MovementPatterns {
            avg_speed: total_distance / steps.len() as f64,
            speed_variations,
            total_distance,
            erratic_movement: speed_variations > ERRATIC_VARIATIONS,
        })
    }
}

/// Consecutive step-length changes strictly greater than [`SPEED_VARIATION_M`]
pub fn count_speed_variations(steps_m: &[f64]) -> usize {
    steps_m
        .windows(2)
        .filter(|w| (w[1] - w[0]).abs() > SPEED_VARIATION_M)
        .count()
}

/// Aggregate view over every tourist's history, for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BehaviorSummary {
    NoData { status: String },
    Active {
        total_users: usize,
        average_movements: f64,
        status: String,
    },
}

/// Per-tourist behavior windows keyed by user id
#[derive(Debug, Default)]
pub struct BehaviorHistory {
    windows: HashMap<String, BehaviorWindow>,
}

impl BehaviorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, user_id: &str, sample: PositionSample) -> &BehaviorWindow {
        let window = self.windows.entry(user_id.to_string()).or_default();
        window.push(sample);
        window
    }

    pub fn window(&self, user_id: &str) -> Option<&BehaviorWindow> {
        self.windows.get(user_id)
    }

    /// Drop windows whose latest fix is older than `idle_for`
    pub fn prune_idle(&mut self, idle_for: Duration, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window
                .latest()
                .map(|s| now - s.timestamp < idle_for)
                .unwrap_or(false)
        });
        before - self.windows.len()
    }

    pub fn user_count(&self) -> usize {
        self.windows.len()
    }

    pub fn summary(&self) -> BehaviorSummary {
        if self.windows.is_empty() {
            return BehaviorSummary::NoData {
                status: "No data available".to_string(),
            };
        }

        let total: usize = self.windows.values().map(BehaviorWindow::len).sum();
        BehaviorSummary::Active {
            total_users: self.windows.len(),
            average_movements: round1(total as f64 / self.windows.len() as f64),
            status: "Active monitoring".to_string(),
        }
    }
}
