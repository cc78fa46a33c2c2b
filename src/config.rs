//! Configuration management for the shelfscan server

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::scan::MatcherConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub books: BookSearchConfig,
    pub vision: VisionConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookSearchConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Number of search responses kept in the LRU cache
    pub cache_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub api_url: String,
    /// Image scanning is disabled without a key
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    pub confidence_threshold: f64,
    pub proximity_px: f64,
    pub session_capacity: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            books: BookSearchConfig {
                api_url: "https://www.googleapis.com/books/v1".to_string(),
                api_key: None,
                timeout_secs: 10,
                cache_size: 512,
            },
            vision: VisionConfig {
                api_url: "https://vision.googleapis.com/v1".to_string(),
                api_key: None,
                timeout_secs: 10,
            },
            scan: ScanConfig {
                confidence_threshold: 0.45,
                proximity_px: 80.0,
                session_capacity: 256,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let timeout_secs = parse_var("HTTP_TIMEOUT_SECS", defaults.books.timeout_secs)?;

        let confidence_threshold: f64 =
            parse_var("SCAN_CONFIDENCE_THRESHOLD", defaults.scan.confidence_threshold)?;
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "SCAN_CONFIDENCE_THRESHOLD",
                value: confidence_threshold.to_string(),
            });
        }

        let proximity_px: f64 = parse_var("SCAN_PROXIMITY_PX", defaults.scan.proximity_px)?;
        if !proximity_px.is_finite() || proximity_px < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "SCAN_PROXIMITY_PX",
                value: proximity_px.to_string(),
            });
        }

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            books: BookSearchConfig {
                api_url: env::var("GOOGLE_BOOKS_API_URL").unwrap_or(defaults.books.api_url),
                api_key: non_empty_var("GOOGLE_BOOKS_API_KEY"),
                timeout_secs,
                cache_size: parse_var("SEARCH_CACHE_SIZE", defaults.books.cache_size)?,
            },
            vision: VisionConfig {
                api_url: env::var("GOOGLE_VISION_API_URL").unwrap_or(defaults.vision.api_url),
                api_key: non_empty_var("GOOGLE_VISION_API_KEY"),
                timeout_secs,
            },
            scan: ScanConfig {
                confidence_threshold,
                proximity_px,
                session_capacity: parse_var("SCAN_SESSION_CAPACITY", defaults.scan.session_capacity)?,
            },
        })
    }

    /// Matcher tuning derived from the scan settings
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            confidence_threshold: self.scan.confidence_threshold,
            proximity_px: self.scan.proximity_px,
            ..MatcherConfig::default()
        }
    }
}

impl BookSearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl VisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
