//! Great-circle geometry for map coordinates

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::{Result, SafetyError};

/// Mean Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(SafetyError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }

    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(self.lat, self.lng, other.lat, other.lng)
    }

    /// "lat, lng" at 4 decimals, the form used in alert text
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Haversine distance in km
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let dlat = (lat2 - lat1) * PI / 180.0;
    let dlng = (lng2 - lng1) * PI / 180.0;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance in metres
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_km(lat1, lng1, lat2, lng2) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_points_are_zero() {
        assert_eq!(haversine_km(48.8566, 2.3522, 48.8566, 2.3522), 0.0);
    }

    #[test]
    fn test_paris_london() {
        let d = haversine_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((d - 343.5).abs() < 1.0, "Paris-London: {}", d);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 10.0, "1 deg lat: {}", d);
    }

    #[test]
    fn test_geopoint_validation() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(SafetyError::InvalidCoordinates { lat: 91.0, lng: 0.0 })
        );
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_label_format() {
        let p = GeoPoint::new(27.175015, 78.042155).unwrap();
        assert_eq!(p.label(), "27.1750, 78.0422");
    }

    fn lat() -> impl Strategy<Value = f64> {
        -90.0f64..=90.0
    }

    fn lng() -> impl Strategy<Value = f64> {
        -180.0f64..=180.0
    }

    proptest! {
        #[test]
        fn test_distance_symmetric(a in lat(), b in lng(), c in lat(), d in lng()) {
            let ab = haversine_km(a, b, c, d);
            let ba = haversine_km(c, d, a, b);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn test_distance_bounded(a in lat(), b in lng(), c in lat(), d in lng()) {
            let dist = haversine_km(a, b, c, d);
            prop_assert!(dist >= 0.0);
            prop_assert!(dist <= PI * EARTH_RADIUS_KM + 1e-6);
        }

        #[test]
        fn test_self_distance_zero(a in lat(), b in lng()) {
            prop_assert!(haversine_km(a, b, a, b).abs() < 1e-9);
        }
    }
}
