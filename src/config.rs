//! Configuration: in-code defaults, an optional `flood-map.toml`, and
//! `FLOODMAP_` environment overrides (double underscore as separator,
//! e.g. `FLOODMAP_API__KEY`).

use config::{ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Seoul open-data API root
    pub base_url: String,
    /// Open-data API key; "sample" works with tight rate limits
    pub key: String,
    /// Rows requested per river
    pub page_size: u32,
    /// Seconds between automatic fetch cycles
    pub refresh_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    /// District-boundary GeoJSON path
    pub boundaries: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Log file path; stdout belongs to the terminal UI
    pub file: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        config::Config::builder()
            .set_default("api.base_url", "http://openapi.seoul.go.kr:8088")?
            .set_default("api.key", "sample")?
            .set_default("api.page_size", 100_i64)?
            .set_default("api.refresh_secs", 300_i64)?
            .set_default("map.boundaries", "data/seoul_districts.json")?
            .set_default("log.file", "flood-map.log")?
            .add_source(File::with_name("flood-map").required(false))
            .add_source(Environment::with_prefix("FLOODMAP").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let config = Config::load().unwrap();
        assert_eq!(config.api.base_url, "http://openapi.seoul.go.kr:8088");
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.refresh_secs, 300);
        assert!(config.map.boundaries.ends_with(".json"));
    }
}
