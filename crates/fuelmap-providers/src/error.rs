use fuelmap_core::CapabilityError;
use thiserror::Error;

/// Errors returned by the Google Maps web-service client.
#[derive(Debug, Error)]
pub enum MapsError {
    /// Network or TLS failure, or a non-2xx HTTP status. The request URL is
    /// stripped because its query string carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The API answered `OVER_QUERY_LIMIT`.
    #[error("rate limited by {endpoint}")]
    RateLimited { endpoint: &'static str },

    /// Any other non-`OK` status in the JSON envelope.
    #[error("{endpoint} returned {status}: {message}")]
    Api {
        endpoint: &'static str,
        status: String,
        message: String,
    },

    /// Directions answered `ZERO_RESULTS` or `NOT_FOUND`.
    #[error("no route between origin and destination")]
    NoRoute,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not usable.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        MapsError::Http(err.without_url())
    }
}

impl MapsError {
    fn provider(&self) -> &'static str {
        match self {
            MapsError::RateLimited { endpoint } | MapsError::Api { endpoint, .. } => *endpoint,
            _ => "google-maps",
        }
    }
}

impl From<MapsError> for CapabilityError {
    fn from(err: MapsError) -> Self {
        match err {
            MapsError::NoRoute => CapabilityError::NoRouteFound,
            other => CapabilityError::Provider {
                provider: other.provider().to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_route_maps_to_no_route_found() {
        assert_eq!(
            CapabilityError::from(MapsError::NoRoute),
            CapabilityError::NoRouteFound
        );
    }

    #[test]
    fn api_error_keeps_endpoint_as_provider() {
        let err = CapabilityError::from(MapsError::Api {
            endpoint: "directions",
            status: "REQUEST_DENIED".to_string(),
            message: "The provided API key is invalid.".to_string(),
        });
        match err {
            CapabilityError::Provider { provider, message } => {
                assert_eq!(provider, "directions");
                assert!(message.contains("REQUEST_DENIED"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
