//! Heuristic movement risk scoring
//!
//! ```text
//! risk = w_erratic·E + w_fast·F + w_slow·S + w_night·N   (clamped to [0, 1])
//! ```
//!
//! | Factor | Weight | Trigger |
//! |--------|--------|---------|
//! | E | 0.30 | erratic movement |
//! | F | 0.20 | avg step > 100 m |
//! | S | 0.10 | avg step < 5 m (possible distress) |
//! | N | 0.20 | local hour >= 22 or <= 5 |

use serde::{Deserialize, Serialize};

use crate::behavior::MovementPatterns;

pub const W_ERRATIC: f64 = 0.3;
pub const W_FAST: f64 = 0.2;
pub const W_SLOW: f64 = 0.1;
pub const W_NIGHT: f64 = 0.2;

/// Average step length (m) above which movement counts as fast
pub const FAST_STEP_M: f64 = 100.0;

/// Average step length (m) below which movement counts as slow
pub const SLOW_STEP_M: f64 = 5.0;

pub const NIGHT_START_HOUR: u32 = 22;
pub const NIGHT_END_HOUR: u32 = 5;

/// Risk at or above this raises a predictive alert
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.7;

const HIGH_RISK_RECOMMENDATION: &str = "High risk detected - Consider safety measures";
const NORMAL_RECOMMENDATION: &str = "Normal activity";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskModel {
    pub w_erratic: f64,
    pub w_fast: f64,
    pub w_slow: f64,
    pub w_night: f64,
    pub alert_threshold: f64,
}

impl Default for RiskModel {
    fn default() -> Self {
        Self {
            w_erratic: W_ERRATIC,
            w_fast: W_FAST,
            w_slow: W_SLOW,
            w_night: W_NIGHT,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: f64,
    pub patterns: MovementPatterns,
    pub recommendation: String,
    pub high_risk: bool,
}

impl RiskAssessment {
    pub fn risk_percent(&self) -> f64 {
        self.risk * 100.0
    }
}

pub fn is_night_hour(hour: u32) -> bool {
    hour >= NIGHT_START_HOUR || hour <= NIGHT_END_HOUR
}

impl RiskModel {
    /// Score patterns observed at the given local hour (0-23)
    pub fn assess(&self, patterns: &MovementPatterns, hour: u32) -> RiskAssessment {
        let mut risk = 0.0;

        if patterns.erratic_movement {
            risk += self.w_erratic;
        }
        if patterns.avg_speed > FAST_STEP_M {
            risk += self.w_fast;
        }
        if patterns.avg_speed < SLOW_STEP_M {
            risk += self.w_slow;
        }
        if is_night_hour(hour) {
            risk += self.w_night;
        }

        let risk: f64 = risk.clamp(0.0, 1.0);
        // Tolerate float accumulation so 0.3 + 0.2 + 0.2 reaches a 0.7 threshold
        let high_risk = risk + 1e-9 >= self.alert_threshold;

        RiskAssessment {
            risk,
            patterns: patterns.clone(),
            recommendation: if high_risk {
                HIGH_RISK_RECOMMENDATION
            } else {
                NORMAL_RECOMMENDATION
            }
            .to_string(),
            high_risk,
        }
    }
}
