use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

/// Budapest city center, the initial map position.
pub const DEFAULT_CENTER_LAT: &str = "47.4979";
pub const DEFAULT_CENTER_LNG: &str = "19.0402";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("FUELMAP_ENV", "development"))?;
    let log_level = or_default("FUELMAP_LOG_LEVEL", "info");
    let stations_path = PathBuf::from(or_default(
        "FUELMAP_STATIONS_PATH",
        "./config/stations.yaml",
    ));
    let google_maps_api_key = lookup("FUELMAP_GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());

    let default_lat: f64 = parse_as(
        "FUELMAP_DEFAULT_LAT",
        &or_default("FUELMAP_DEFAULT_LAT", DEFAULT_CENTER_LAT),
    )?;
    let default_lng: f64 = parse_as(
        "FUELMAP_DEFAULT_LNG",
        &or_default("FUELMAP_DEFAULT_LNG", DEFAULT_CENTER_LNG),
    )?;
    let default_center =
        Coordinate::new(default_lat, default_lng).map_err(|e| ConfigError::InvalidEnvVar {
            var: "FUELMAP_DEFAULT_LAT/FUELMAP_DEFAULT_LNG".to_string(),
            reason: e.to_string(),
        })?;

    let locate_timeout_ms: u64 = parse_as(
        "FUELMAP_LOCATE_TIMEOUT_MS",
        &or_default("FUELMAP_LOCATE_TIMEOUT_MS", "4000"),
    )?;
    let search_radius_m: u32 = parse_as(
        "FUELMAP_SEARCH_RADIUS_M",
        &or_default("FUELMAP_SEARCH_RADIUS_M", "7000"),
    )?;
    let search_category = or_default("FUELMAP_SEARCH_CATEGORY", "gas_station");

    let nearby_radius_km: f64 = parse_as(
        "FUELMAP_NEARBY_RADIUS_KM",
        &or_default("FUELMAP_NEARBY_RADIUS_KM", "5"),
    )?;
    if !nearby_radius_km.is_finite() || nearby_radius_km < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FUELMAP_NEARBY_RADIUS_KM".to_string(),
            reason: format!("must be a non-negative number, got {nearby_radius_km}"),
        });
    }

    let list_limit: usize = parse_as("FUELMAP_LIST_LIMIT", &or_default("FUELMAP_LIST_LIMIT", "12"))?;

    let http_timeout_secs: u64 = parse_as(
        "FUELMAP_HTTP_TIMEOUT_SECS",
        &or_default("FUELMAP_HTTP_TIMEOUT_SECS", "30"),
    )?;
    let http_user_agent = or_default("FUELMAP_HTTP_USER_AGENT", "fuelmap/0.1 (station-finder)");
    let http_max_retries: u32 = parse_as(
        "FUELMAP_HTTP_MAX_RETRIES",
        &or_default("FUELMAP_HTTP_MAX_RETRIES", "2"),
    )?;
    let http_retry_backoff_ms: u64 = parse_as(
        "FUELMAP_HTTP_RETRY_BACKOFF_MS",
        &or_default("FUELMAP_HTTP_RETRY_BACKOFF_MS", "500"),
    )?;

    Ok(AppConfig {
        env,
        log_level,
        stations_path,
        google_maps_api_key,
        default_center,
        locate_timeout_ms,
        search_radius_m,
        search_category,
        nearby_radius_km,
        list_limit,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_ms,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FUELMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(
            parse_environment("development").unwrap(),
            Environment::Development
        );
        assert_eq!(parse_environment("test").unwrap(), Environment::Test);
        assert_eq!(
            parse_environment("production").unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn parse_environment_unknown_fails() {
        let err = parse_environment("staging").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "FUELMAP_ENV"));
    }

    #[test]
    fn build_app_config_defaults() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(
            cfg.stations_path.to_string_lossy(),
            "./config/stations.yaml"
        );
        assert!(cfg.google_maps_api_key.is_none());
        assert_eq!(cfg.default_center, Coordinate::new(47.4979, 19.0402).unwrap());
        assert_eq!(cfg.locate_timeout_ms, 4000);
        assert_eq!(cfg.search_radius_m, 7000);
        assert_eq!(cfg.search_category, "gas_station");
        assert_eq!(cfg.nearby_radius_km, 5.0);
        assert_eq!(cfg.list_limit, 12);
        assert_eq!(cfg.http_timeout_secs, 30);
        assert_eq!(cfg.http_user_agent, "fuelmap/0.1 (station-finder)");
        assert_eq!(cfg.http_max_retries, 2);
        assert_eq!(cfg.http_retry_backoff_ms, 500);
    }

    #[test]
    fn build_app_config_overrides() {
        let mut map = HashMap::new();
        map.insert("FUELMAP_ENV", "production");
        map.insert("FUELMAP_GOOGLE_MAPS_API_KEY", "abc123");
        map.insert("FUELMAP_DEFAULT_LAT", "46.253");
        map.insert("FUELMAP_DEFAULT_LNG", "20.1414");
        map.insert("FUELMAP_LOCATE_TIMEOUT_MS", "1500");
        map.insert("FUELMAP_NEARBY_RADIUS_KM", "2.5");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Production);
        assert_eq!(cfg.google_maps_api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.default_center.lat(), 46.253);
        assert_eq!(cfg.locate_timeout().as_millis(), 1500);
        assert_eq!(cfg.nearby_radius_km, 2.5);
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let mut map = HashMap::new();
        map.insert("FUELMAP_GOOGLE_MAPS_API_KEY", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.google_maps_api_key.is_none());
    }

    #[test]
    fn invalid_number_is_reported_with_var_name() {
        let mut map = HashMap::new();
        map.insert("FUELMAP_SEARCH_RADIUS_M", "far");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FUELMAP_SEARCH_RADIUS_M"),
            "expected InvalidEnvVar(FUELMAP_SEARCH_RADIUS_M), got: {result:?}"
        );
    }

    #[test]
    fn out_of_range_default_center_is_rejected() {
        let mut map = HashMap::new();
        map.insert("FUELMAP_DEFAULT_LAT", "123.0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn negative_nearby_radius_is_rejected() {
        let mut map = HashMap::new();
        map.insert("FUELMAP_NEARBY_RADIUS_KM", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FUELMAP_NEARBY_RADIUS_KM")
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut map = HashMap::new();
        map.insert("FUELMAP_GOOGLE_MAPS_API_KEY", "super-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("[redacted]"));
    }
}
