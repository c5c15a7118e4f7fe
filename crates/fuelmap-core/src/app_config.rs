use std::path::PathBuf;
use std::time::Duration;

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub stations_path: PathBuf,
    pub google_maps_api_key: Option<String>,
    /// Map center used when the real position cannot be obtained.
    pub default_center: Coordinate,
    pub locate_timeout_ms: u64,
    pub search_radius_m: u32,
    pub search_category: String,
    pub nearby_radius_km: f64,
    pub list_limit: usize,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_millis(self.locate_timeout_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("stations_path", &self.stations_path)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("default_center", &self.default_center)
            .field("locate_timeout_ms", &self.locate_timeout_ms)
            .field("search_radius_m", &self.search_radius_m)
            .field("search_category", &self.search_category)
            .field("nearby_radius_km", &self.nearby_radius_km)
            .field("list_limit", &self.list_limit)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_retry_backoff_ms", &self.http_retry_backoff_ms)
            .finish()
    }
}
