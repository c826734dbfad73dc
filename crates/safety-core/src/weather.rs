//! Weather classification and safety alerts
//!
//! Maps WMO weather codes to descriptions and derives traveller alerts from
//! current conditions. No network access here; the gateway fetches conditions
//! and hands them to [`WeatherReport::from_current`].

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

pub const THUNDERSTORM_ALERT: &str = "⚡ THUNDERSTORM WARNING: Seek shelter immediately!";
pub const HEAVY_RAIN_ALERT: &str = "🌧️ HEAVY RAIN ALERT: Roads may be slippery, drive cautiously!";
pub const HIGH_WIND_ALERT: &str = "💨 HIGH WIND WARNING: Strong winds detected, secure loose objects!";
pub const HEAT_ALERT: &str = "🔥 HEAT WARNING: Extreme heat conditions, stay hydrated!";
pub const FREEZE_ALERT: &str = "❄️ FREEZE WARNING: Freezing temperatures, dress warmly!";
pub const SNOW_ALERT: &str = "❄️ SNOW ALERT: Snow conditions may affect travel!";
pub const FOG_ALERT: &str = "🌫️ FOG ALERT: Reduced visibility, drive carefully!";
pub const HEAVY_PRECIPITATION_ALERT: &str = "🌧️ HEAVY PRECIPITATION: Flooding risk, avoid low-lying areas!";

/// Current conditions at a point, in Open-Meteo units (°C, %, km/h, mm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub relative_humidity: f64,
    pub precipitation: f64,
    pub weather_code: i32,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub description: String,
    pub icon: String,
    pub coordinates: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<String>,
}

impl WeatherReport {
    pub fn from_current(location: GeoPoint, current: &CurrentConditions) -> Self {
        let (description, icon) = describe_weather_code(current.weather_code);
        Self {
            temperature: current.temperature.round() as i64,
            feels_like: current.apparent_temperature.round() as i64,
            humidity: current.relative_humidity,
            wind_speed: current.wind_speed,
            precipitation: current.precipitation,
            description: description.to_string(),
            icon: icon.to_string(),
            coordinates: location.label(),
            alerts: check_weather_alerts(
                current.weather_code,
                current.wind_speed,
                current.temperature,
                current.precipitation,
            ),
        }
    }

    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// WMO code to `(description, icon)`
pub fn describe_weather_code(code: i32) -> (&'static str, &'static str) {
    match code {
        0 => ("Clear sky", "☀️"),
        1 => ("Mainly clear", "🌤️"),
        2 => ("Partly cloudy", "⛅"),
        3 => ("Overcast", "☁️"),
        45 => ("Fog", "🌫️"),
        48 => ("Depositing rime fog", "🌫️"),
        51 => ("Light drizzle", "🌦️"),
        53 => ("Moderate drizzle", "🌦️"),
        55 => ("Dense drizzle", "🌦️"),
        56 => ("Light freezing drizzle", "🌨️"),
        57 => ("Dense freezing drizzle", "🌨️"),
        61 => ("Slight rain", "🌧️"),
        63 => ("Moderate rain", "🌧️"),
        65 => ("Heavy rain", "🌧️"),
        66 => ("Light freezing rain", "🌨️"),
        67 => ("Heavy freezing rain", "🌨️"),
        71 => ("Slight snow fall", "❄️"),
        73 => ("Moderate snow fall", "❄️"),
        75 => ("Heavy snow fall", "❄️"),
        77 => ("Snow grains", "❄️"),
        80 => ("Slight rain showers", "🌦️"),
        81 => ("Moderate rain showers", "🌦️"),
        82 => ("Violent rain showers", "🌧️"),
        85 => ("Slight snow showers", "❄️"),
        86 => ("Heavy snow showers", "❄️"),
        95 => ("Thunderstorm", "⛈️"),
        96 => ("Thunderstorm with slight hail", "⛈️"),
        99 => ("Thunderstorm with heavy hail", "⛈️"),
        _ => ("Unknown", "❓"),
    }
}

/// Traveller alerts for the given conditions, most severe first
pub fn check_weather_alerts(code: i32, wind_kmh: f64, temp_c: f64, precip_mm: f64) -> Vec<String> {
    let mut alerts = Vec::new();

    if (95..=99).contains(&code) {
        alerts.push(THUNDERSTORM_ALERT);
    }
    let rain = (61..=67).contains(&code) || (80..=82).contains(&code);
    if rain && wind_kmh > 20.0 {
        alerts.push(HEAVY_RAIN_ALERT);
    }
    if wind_kmh > 30.0 {
        alerts.push(HIGH_WIND_ALERT);
    }
    if temp_c > 40.0 {
        alerts.push(HEAT_ALERT);
    }
    if temp_c < 0.0 {
        alerts.push(FREEZE_ALERT);
    }
    if (71..=77).contains(&code) || (85..=86).contains(&code) {
        alerts.push(SNOW_ALERT);
    }
    if code == 45 || code == 48 {
        alerts.push(FOG_ALERT);
    }
    if precip_mm > 10.0 {
        alerts.push(HEAVY_PRECIPITATION_ALERT);
    }

    alerts.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(code: i32, temp: f64, wind: f64, precip: f64) -> CurrentConditions {
        CurrentConditions {
            temperature: temp,
            apparent_temperature: temp - 1.6,
            relative_humidity: 70.0,
            precipitation: precip,
            weather_code: code,
            wind_speed: wind,
        }
    }

    #[test]
    fn test_code_table() {
        assert_eq!(describe_weather_code(0), ("Clear sky", "☀️"));
        assert_eq!(describe_weather_code(82), ("Violent rain showers", "🌧️"));
        assert_eq!(describe_weather_code(99).0, "Thunderstorm with heavy hail");
        assert_eq!(describe_weather_code(4), ("Unknown", "❓"));
    }

    #[test]
    fn test_calm_day_has_no_alerts() {
        assert!(check_weather_alerts(1, 10.0, 22.0, 0.0).is_empty());
    }

    #[test]
    fn test_rain_needs_wind() {
        assert!(check_weather_alerts(63, 15.0, 18.0, 2.0).is_empty());
        assert_eq!(check_weather_alerts(63, 25.0, 18.0, 2.0), vec![HEAVY_RAIN_ALERT]);
    }

    #[test]
    fn test_alert_order() {
        let alerts = check_weather_alerts(95, 45.0, 41.0, 12.0);
        assert_eq!(
            alerts,
            vec![THUNDERSTORM_ALERT, HIGH_WIND_ALERT, HEAT_ALERT, HEAVY_PRECIPITATION_ALERT]
        );

        let alerts = check_weather_alerts(86, 5.0, -3.0, 0.0);
        assert_eq!(alerts, vec![FREEZE_ALERT, SNOW_ALERT]);

        assert_eq!(check_weather_alerts(48, 0.0, 5.0, 0.0), vec![FOG_ALERT]);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        assert!(check_weather_alerts(0, 30.0, 40.0, 10.0).is_empty());
        assert!(check_weather_alerts(0, 0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_report_from_current() {
        let point = GeoPoint::new(48.85661, 2.35222).unwrap();
        let report = WeatherReport::from_current(point, &conditions(2, 21.6, 12.0, 0.0));
        assert_eq!(report.temperature, 22);
        assert_eq!(report.feels_like, 20);
        assert_eq!(report.description, "Partly cloudy");
        assert_eq!(report.coordinates, "48.8566, 2.3522");
        assert!(!report.has_alerts());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("alerts").is_none());
    }

    #[test]
    fn test_report_carries_alerts() {
        let point = GeoPoint::new(1.0, 2.0).unwrap();
        let report = WeatherReport::from_current(point, &conditions(96, 30.0, 35.0, 0.0));
        assert_eq!(report.alerts, vec![THUNDERSTORM_ALERT, HIGH_WIND_ALERT]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["alerts"].as_array().unwrap().len(), 2);
    }
}
