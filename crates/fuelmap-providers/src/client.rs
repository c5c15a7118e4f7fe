//! HTTP client for the Google Maps web-service APIs.
//!
//! Wraps `reqwest` with API key management, the shared `status` envelope
//! check, and retry on transient failures. Endpoint-specific parsing lives in
//! [`crate::places`] and [`crate::directions`].

use std::time::Duration;

use fuelmap_core::AppConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::MapsError;
use crate::retry::retry_with_backoff;
use crate::types::StatusEnvelope;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";

/// HTTP tuning shared by every Maps request.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            user_agent: config.http_user_agent.clone(),
            max_retries: config.http_max_retries,
            retry_backoff_ms: config.http_retry_backoff_ms,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "fuelmap/0.1 (station-finder)".to_string(),
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

/// Client for the Places Nearby Search and Directions endpoints.
///
/// Use [`GoogleMapsClient::new`] for production or
/// [`GoogleMapsClient::with_base_url`] to point at a mock server in tests.
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl std::fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl GoogleMapsClient {
    /// Creates a client pointed at the production Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, settings: &HttpSettings) -> Result<Self, MapsError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MapsError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        settings: &HttpSettings,
        base_url: &str,
    ) -> Result<Self, MapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MapsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: settings.max_retries,
            retry_backoff_ms: settings.retry_backoff_ms,
        })
    }

    /// Builds the request URL for `path` with percent-encoded query parameters
    /// and the API key appended last.
    pub(crate) fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, MapsError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| MapsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// GETs `url`, checks the `status` envelope, and decodes the body as `T`.
    ///
    /// `ok_statuses` lists envelope statuses that count as success for this
    /// endpoint (e.g. `ZERO_RESULTS` for nearby search). Transient failures
    /// are retried per the client's retry policy.
    pub(crate) async fn get_json<T>(
        &self,
        endpoint: &'static str,
        url: &Url,
        ok_statuses: &[&str],
    ) -> Result<(String, T), MapsError>
    where
        T: DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, || async move {
            tracing::debug!(endpoint, "maps request");
            let response = self.client.get(url.clone()).send().await?;
            let response = response.error_for_status()?;
            let body = response.text().await?;
            let value: serde_json::Value =
                serde_json::from_str(&body).map_err(|e| MapsError::Deserialize {
                    context: endpoint.to_string(),
                    source: e,
                })?;

            let envelope: StatusEnvelope = serde_json::from_value(value.clone()).map_err(|e| {
                MapsError::Deserialize {
                    context: format!("{endpoint} status envelope"),
                    source: e,
                }
            })?;
            check_status(endpoint, &envelope, ok_statuses)?;

            let payload: T = serde_json::from_value(value).map_err(|e| MapsError::Deserialize {
                context: endpoint.to_string(),
                source: e,
            })?;
            Ok((envelope.status, payload))
        })
        .await
    }
}

/// Maps a non-success envelope status onto a typed error.
fn check_status(
    endpoint: &'static str,
    envelope: &StatusEnvelope,
    ok_statuses: &[&str],
) -> Result<(), MapsError> {
    if ok_statuses.contains(&envelope.status.as_str()) {
        return Ok(());
    }
    if envelope.status == "OVER_QUERY_LIMIT" {
        return Err(MapsError::RateLimited { endpoint });
    }
    Err(MapsError::Api {
        endpoint,
        status: envelope.status.clone(),
        message: envelope
            .error_message
            .clone()
            .unwrap_or_else(|| "no error message".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GoogleMapsClient {
        GoogleMapsClient::with_base_url("test-key", &HttpSettings::default(), base_url)
            .expect("client construction should not fail")
    }

    fn envelope(status: &str) -> StatusEnvelope {
        StatusEnvelope {
            status: status.to_string(),
            error_message: None,
        }
    }

    #[test]
    fn build_url_appends_path_and_key() {
        let client = test_client("https://maps.example.com");
        let url = client
            .build_url("maps/api/directions/json", &[("mode", "driving")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.example.com/maps/api/directions/json?mode=driving&key=test-key"
        );
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let client = test_client("https://proxy.example.com/google/");
        let url = client.build_url("maps/api/place/nearbysearch/json", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://proxy.example.com/google/maps/api/place/nearbysearch/json?key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("https://maps.example.com");
        let url = client
            .build_url("maps/api/place/nearbysearch/json", &[("keyword", "mol & shell")])
            .unwrap();
        assert!(
            url.as_str().contains("mol+%26+shell") || url.as_str().contains("mol%20%26%20shell"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = GoogleMapsClient::with_base_url("k", &HttpSettings::default(), "not a url");
        assert!(matches!(result, Err(MapsError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn check_status_accepts_listed_statuses() {
        assert!(check_status("places", &envelope("OK"), &["OK", "ZERO_RESULTS"]).is_ok());
        assert!(check_status("places", &envelope("ZERO_RESULTS"), &["OK", "ZERO_RESULTS"]).is_ok());
    }

    #[test]
    fn check_status_maps_over_query_limit_to_rate_limited() {
        let err = check_status("places", &envelope("OVER_QUERY_LIMIT"), &["OK"]).unwrap_err();
        assert!(matches!(err, MapsError::RateLimited { endpoint: "places" }));
    }

    #[test]
    fn check_status_surfaces_error_message() {
        let env = StatusEnvelope {
            status: "REQUEST_DENIED".to_string(),
            error_message: Some("The provided API key is invalid.".to_string()),
        };
        let err = check_status("directions", &env, &["OK"]).unwrap_err();
        assert!(
            matches!(err, MapsError::Api { ref status, ref message, .. }
                if status == "REQUEST_DENIED" && message.contains("invalid"))
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = test_client("https://maps.example.com");
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("test-key"));
    }
}
