//! Integration tests for `GoogleMapsClient` using wiremock HTTP mocks.

use fuelmap_core::{
    CapabilityError, Coordinate, DirectionsProvider, NearbyQuery, PlacesProvider, RouteQuery,
    TravelMode,
};
use fuelmap_providers::{GoogleMapsClient, HttpSettings, MapsError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GoogleMapsClient {
    let settings = HttpSettings {
        timeout_secs: 5,
        user_agent: "fuelmap-test".to_string(),
        max_retries: 2,
        retry_backoff_ms: 0,
    };
    GoogleMapsClient::with_base_url("test-key", &settings, base_url)
        .expect("client construction should not fail")
}

fn budapest() -> Coordinate {
    Coordinate::new(47.4979, 19.0402).unwrap()
}

fn nearby_query() -> NearbyQuery {
    NearbyQuery {
        center: budapest(),
        radius_m: 7000,
        category: "gas_station".to_string(),
    }
}

fn route_query() -> RouteQuery {
    RouteQuery {
        origin: budapest(),
        destination: Coordinate::new(47.51, 19.06).unwrap(),
        mode: TravelMode::Driving,
    }
}

#[tokio::test]
async fn nearby_search_returns_hits() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            {
                "place_id": "ChIJ-mol-1",
                "name": "MOL Budapest Váci út",
                "geometry": { "location": { "lat": 47.53, "lng": 19.07 } }
            },
            {
                "place_id": "ChIJ-nogeo",
                "name": "Family Market"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .and(query_param("location", "47.4979,19.0402"))
        .and(query_param("radius", "7000"))
        .and(query_param("type", "gas_station"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hits = client
        .nearby_search(&nearby_query())
        .await
        .expect("should parse hits");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].provider_id.as_str(), "ChIJ-mol-1");
    assert_eq!(hits[0].name.as_deref(), Some("MOL Budapest Váci út"));
    assert_eq!(hits[0].lat, Some(47.53));
    assert_eq!(hits[1].lat, None, "missing geometry stays missing");
}

#[tokio::test]
async fn nearby_search_zero_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hits = PlacesProvider::search(&client, &nearby_query())
        .await
        .expect("zero results is not an error");
    assert!(hits.is_empty());
}

#[tokio::test]
async fn nearby_search_request_denied_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = PlacesProvider::search(&client, &nearby_query())
        .await
        .unwrap_err();
    assert!(
        matches!(err, CapabilityError::Provider { ref message, .. } if message.contains("REQUEST_DENIED")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn nearby_search_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{
                    "place_id": "ChIJ-shell",
                    "name": "Shell",
                    "geometry": { "location": { "lat": 47.49, "lng": 19.03 } }
                }]
            })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let hits = client
        .nearby_search(&nearby_query())
        .await
        .expect("second attempt should succeed");
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn directions_sums_legs_and_keeps_polyline() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "routes": [{
            "legs": [
                { "distance": { "value": 2400, "text": "2.4 km" }, "duration": { "value": 300, "text": "5 mins" } },
                { "distance": { "value": 1350, "text": "1.4 km" }, "duration": { "value": 200, "text": "3 mins" } }
            ],
            "overview_polyline": { "points": "a~l~Fjk~uOwHJy@P" }
        }]
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .and(query_param("mode", "driving"))
        .and(query_param("origin", "47.497900,19.040200"))
        .and(query_param("destination", "47.510000,19.060000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let legs = DirectionsProvider::route(&client, &route_query())
        .await
        .expect("should parse route");
    assert_eq!(legs.legs.len(), 2);
    assert_eq!(legs.total_distance_m(), 3750);
    assert_eq!(legs.total_duration_s(), 500);
    assert_eq!(legs.polyline.as_deref(), Some("a~l~Fjk~uOwHJy@P"));
}

#[tokio::test]
async fn directions_zero_results_is_no_route() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "routes": [] })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.directions(&route_query()).await.unwrap_err();
    assert!(matches!(err, MapsError::NoRoute), "got {err:?}");

    let err = DirectionsProvider::route(&client, &route_query()).await;
    assert_eq!(err, Err(CapabilityError::NoRouteFound));
}

#[tokio::test]
async fn directions_over_query_limit_exhausts_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "OVER_QUERY_LIMIT" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.directions(&route_query()).await.unwrap_err();
    assert!(matches!(err, MapsError::RateLimited { endpoint: "directions" }));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.directions(&route_query()).await.unwrap_err();
    assert!(matches!(err, MapsError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn http_failure_does_not_expose_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let settings = HttpSettings {
        timeout_secs: 5,
        user_agent: "fuelmap-test".to_string(),
        max_retries: 0,
        retry_backoff_ms: 0,
    };
    let client = GoogleMapsClient::with_base_url("SUPER-SECRET-KEY", &settings, &server.uri())
        .expect("client construction should not fail");

    let err = client.nearby_search(&nearby_query()).await.unwrap_err();
    assert!(matches!(err, MapsError::Http(_)), "got {err:?}");
    assert!(!format!("{err} {err:?}").contains("SUPER-SECRET-KEY"));

    let err = PlacesProvider::search(&client, &nearby_query()).await.unwrap_err();
    match err {
        CapabilityError::Provider { message, .. } => {
            assert!(message.contains("503"), "got {message}");
            assert!(!message.contains("SUPER-SECRET-KEY"), "key leaked: {message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}
