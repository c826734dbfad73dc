//! Live weather from Open-Meteo (free, no API key)
//!
//! # Usage
//!
//! ```rust,ignore
//! let api = WeatherApi::open_meteo()?;
//! let weather = api.fetch_current(48.8566, 2.3522).await?;
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{get_json, http_client, Result, DEFAULT_USER_AGENT};

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    pub base_url: String,
    /// Cache TTL in seconds (default: 300 = 5 minutes)
    pub cache_ttl_sec: u64,
    pub timeout_sec: u64,
    pub user_agent: String,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: OPEN_METEO_URL.to_string(),
            cache_ttl_sec: 300,
            timeout_sec: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    latitude: f64,
    longitude: f64,
    current: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: f64,
    #[serde(default)]
    apparent_temperature: f64,
    #[serde(default)]
    precipitation: f64,
    #[serde(default)]
    weather_code: i32,
    #[serde(default)]
    wind_speed_10m: f64,
}

/// Current conditions at the grid point Open-Meteo resolved the request to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub latitude: f64,
    pub longitude: f64,
    /// °C
    pub temperature: f64,
    /// °C
    pub apparent_temperature: f64,
    /// %
    pub relative_humidity: f64,
    /// mm
    pub precipitation: f64,
    /// WMO code
    pub weather_code: i32,
    /// km/h
    pub wind_speed: f64,
    pub fetched_at: DateTime<Utc>,
}

impl From<OpenMeteoResponse> for CurrentWeather {
    fn from(data: OpenMeteoResponse) -> Self {
        Self {
            latitude: data.latitude,
            longitude: data.longitude,
            temperature: data.current.temperature_2m,
            apparent_temperature: data.current.apparent_temperature,
            relative_humidity: data.current.relative_humidity_2m,
            precipitation: data.current.precipitation,
            weather_code: data.current.weather_code,
            wind_speed: data.current.wind_speed_10m,
            fetched_at: Utc::now(),
        }
    }
}

struct CacheEntry {
    weather: CurrentWeather,
    expires_at: Instant,
}

/// Open-Meteo client with a per-location TTL cache
pub struct WeatherApi {
    config: WeatherApiConfig,
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl WeatherApi {
    pub fn open_meteo() -> Result<Self> {
        Self::new(WeatherApiConfig::default())
    }

    pub fn new(config: WeatherApiConfig) -> Result<Self> {
        let client = http_client(config.timeout_sec, &config.user_agent)?;
        Ok(Self {
            config,
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Cache key from coordinates (rounded to 2 decimal places, ~1 km)
    pub fn cache_key(lat: f64, lon: f64) -> String {
        format!("{:.2},{:.2}", lat, lon)
    }

    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let key = Self::cache_key(lat, lon);

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.expires_at > Instant::now() {
                    debug!(key = %key, "weather cache hit");
                    return Ok(entry.weather.clone());
                }
            }
        }

        let request = self.client.get(&self.config.base_url).query(&[
            ("latitude", format!("{:.6}", lat)),
            ("longitude", format!("{:.6}", lon)),
            ("current", CURRENT_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ]);
        let data: OpenMeteoResponse = get_json(request, "Open-Meteo").await?;
        let weather = CurrentWeather::from(data);

        self.insert(key, weather.clone()).await;
        Ok(weather)
    }

    /// Expired entries are swept on every insert, so the cache never outgrows the live set.
    async fn insert(&self, key: String, weather: CurrentWeather) {
        let now = Instant::now();
        let mut cache = self.cache.write().await;
        cache.retain(|_, entry| entry.expires_at > now);
        cache.insert(
            key,
            CacheEntry {
                weather,
                expires_at: now + Duration::from_secs(self.config.cache_ttl_sec),
            },
        );
    }

    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
    }

    /// `(total entries, unexpired entries)`
    pub async fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.read().await;
        let total = cache.len();
        let valid = cache
            .values()
            .filter(|e| e.expires_at > Instant::now())
            .count();
        (total, valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "latitude": 48.86,
        "longitude": 2.3399997,
        "current": {
            "time": "2024-06-01T14:00",
            "temperature_2m": 21.4,
            "relative_humidity_2m": 56,
            "apparent_temperature": 20.9,
            "precipitation": 0.0,
            "weather_code": 2,
            "wind_speed_10m": 11.2
        }
    }"#;

    fn sample() -> CurrentWeather {
        let data: OpenMeteoResponse = serde_json::from_str(SAMPLE).unwrap();
        CurrentWeather::from(data)
    }

    #[test]
    fn test_cache_key_rounds_to_two_places() {
        assert_eq!(WeatherApi::cache_key(48.85661, 2.35222), "48.86,2.35");
        assert_eq!(WeatherApi::cache_key(48.8549, 2.3501), "48.85,2.35");
    }

    #[test]
    fn test_parse_open_meteo_response() {
        let weather = sample();
        assert_eq!(weather.weather_code, 2);
        assert_eq!(weather.relative_humidity, 56.0);
        assert!((weather.temperature - 21.4).abs() < 1e-9);
        assert!((weather.longitude - 2.34).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_cache_hit_avoids_network() {
        // Unroutable base URL: any real request would fail
        let api = WeatherApi::new(WeatherApiConfig {
            base_url: "http://127.0.0.1:9/forecast".to_string(),
            timeout_sec: 1,
            ..WeatherApiConfig::default()
        })
        .unwrap();

        api.insert(WeatherApi::cache_key(48.8566, 2.3522), sample()).await;
        let weather = api.fetch_current(48.8566, 2.3522).await.unwrap();
        assert_eq!(weather.weather_code, 2);
        assert_eq!(api.cache_stats().await, (1, 1));

        api.clear_cache().await;
        assert_eq!(api.cache_stats().await, (0, 0));
        assert!(api.fetch_current(48.8566, 2.3522).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_entries_are_counted_separately() {
        let api = WeatherApi::new(WeatherApiConfig {
            cache_ttl_sec: 0,
            ..WeatherApiConfig::default()
        })
        .unwrap();
        api.insert("1.00,1.00".to_string(), sample()).await;
        assert_eq!(api.cache_stats().await, (1, 0));
    }

    #[tokio::test]
    async fn test_insert_sweeps_expired_entries() {
        let api = WeatherApi::new(WeatherApiConfig {
            cache_ttl_sec: 0,
            ..WeatherApiConfig::default()
        })
        .unwrap();
        for i in 0..1000 {
            api.insert(format!("{}.00,0.00", i), sample()).await;
        }
        let (total, valid) = api.cache_stats().await;
        assert_eq!(total, 1);
        assert_eq!(valid, 0);
    }

    #[tokio::test]
    async fn test_insert_keeps_live_entries() {
        let api = WeatherApi::new(WeatherApiConfig::default()).unwrap();
        for i in 0..10 {
            api.insert(format!("{}.00,0.00", i), sample()).await;
        }
        assert_eq!(api.cache_stats().await, (10, 10));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_open_meteo_fetch() {
        let api = WeatherApi::open_meteo().unwrap();
        match api.fetch_current(40.7128, -74.0060).await {
            Ok(weather) => {
                assert!(weather.temperature > -60.0 && weather.temperature < 60.0);
                assert_eq!(api.cache_stats().await.0, 1);
            }
            Err(e) => println!("API error (may be expected): {}", e),
        }
    }
}
