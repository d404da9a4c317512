use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_GEO_PRIMARY_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_GEO_SECONDARY_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_PREFERENCE_STORE_PATH: &str = ".site-locale/preferences.json";

#[derive(Debug, Clone)]
pub struct Config {
    // Geolocation
    pub geo_enabled: bool,
    pub geo_primary_url: String,
    pub geo_secondary_url: String,
    pub geo_timeout_secs: u64,

    // Persistence
    pub preference_store_path: PathBuf,

    // Server
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geo_enabled: true,
            geo_primary_url: DEFAULT_GEO_PRIMARY_URL.to_string(),
            geo_secondary_url: DEFAULT_GEO_SECONDARY_URL.to_string(),
            geo_timeout_secs: 5,
            preference_store_path: PathBuf::from(DEFAULT_PREFERENCE_STORE_PATH),
            port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            // Geolocation
            geo_enabled: std::env::var("GEO_ENABLED")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.geo_enabled),
            geo_primary_url: std::env::var("GEO_PRIMARY_URL")
                .unwrap_or(defaults.geo_primary_url),
            geo_secondary_url: std::env::var("GEO_SECONDARY_URL")
                .unwrap_or(defaults.geo_secondary_url),
            geo_timeout_secs: std::env::var("GEO_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.geo_timeout_secs),

            // Persistence
            preference_store_path: std::env::var("PREFERENCE_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preference_store_path),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        };

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("GEO_PRIMARY_URL", &self.geo_primary_url),
            ("GEO_SECONDARY_URL", &self.geo_secondary_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
