//! Gateway configuration from the environment

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 18700;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub ui_dir: PathBuf,
    pub hotspot_refresh_secs: u64,
    pub notification_cooldown_secs: i64,
    pub weather_cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Stopped tracking sessions older than this are pruned
    pub session_retention_secs: i64,
    /// Active sessions and behavior histories with no fix for this long are expired
    pub idle_timeout_secs: i64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            ui_dir: PathBuf::from("ui/dist"),
            hotspot_refresh_secs: 60,
            notification_cooldown_secs: 30,
            weather_cache_ttl_secs: 300,
            http_timeout_secs: 10,
            user_agent: open_data::DEFAULT_USER_AGENT.to_string(),
            session_retention_secs: 3600,
            idle_timeout_secs: 1800,
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("SAFETY_GATEWAY_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid port: {:?}", raw))?,
            None => defaults.port,
        };

        Ok(Self {
            bind_addr: lookup("SAFETY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            ui_dir: lookup("SAFETY_UI_DIR").map(PathBuf::from).unwrap_or(defaults.ui_dir),
            hotspot_refresh_secs: parsed(&lookup, "SAFETY_HOTSPOT_REFRESH_SECS", defaults.hotspot_refresh_secs)?,
            notification_cooldown_secs: parsed(
                &lookup,
                "SAFETY_NOTIFICATION_COOLDOWN_SECS",
                defaults.notification_cooldown_secs,
            )?,
            weather_cache_ttl_secs: parsed(&lookup, "SAFETY_WEATHER_CACHE_TTL_SECS", defaults.weather_cache_ttl_secs)?,
            http_timeout_secs: parsed(&lookup, "SAFETY_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            user_agent: lookup("SAFETY_USER_AGENT").unwrap_or(defaults.user_agent),
            session_retention_secs: parsed(&lookup, "SAFETY_SESSION_RETENTION_SECS", defaults.session_retention_secs)?,
            idle_timeout_secs: parsed(&lookup, "SAFETY_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 18700);
        assert_eq!(config.listen_addr(), "0.0.0.0:18700");
        assert_eq!(config.hotspot_refresh_secs, 60);
        assert_eq!(config.notification_cooldown_secs, 30);
        assert_eq!(config.ui_dir, PathBuf::from("ui/dist"));
        assert_eq!(config.idle_timeout_secs, 1800);
    }

    #[test]
    fn test_port_fallback_order() {
        let config = GatewayConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.port, 8080);

        let config = GatewayConfig::from_lookup(lookup(&[("PORT", "8080"), ("SAFETY_GATEWAY_PORT", "9000")])).unwrap();
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("SAFETY_BIND_ADDR", "127.0.0.1"),
            ("SAFETY_WEATHER_CACHE_TTL_SECS", " 60 "),
            ("SAFETY_USER_AGENT", "test-agent/0.1"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.weather_cache_ttl_secs, 60);
        assert_eq!(config.user_agent, "test-agent/0.1");
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(GatewayConfig::from_lookup(lookup(&[("SAFETY_GATEWAY_PORT", "http")])).is_err());
        let err = GatewayConfig::from_lookup(lookup(&[("SAFETY_HOTSPOT_REFRESH_SECS", "-5")])).unwrap_err();
        assert!(err.to_string().contains("SAFETY_HOTSPOT_REFRESH_SECS"));
    }
}
