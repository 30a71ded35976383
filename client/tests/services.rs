use harvest_client::tracking::{lookup_scanned_batch, JOURNEY_NOT_FOUND};
use harvest_client::weather::WeatherService;
use harvest_client::{ApiClient, ClientConfig, ClientError};
use harvest_common::actions::{plan_submission, ActionForm, ActionSubmission, RoleAction};
use harvest_common::analytics::AnalyticsSummary;
use harvest_common::batch::BatchEvent;
use harvest_common::location::GeoLocation;
use harvest_common::product::ProductPageQuery;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ApiClient {
    let api = ApiClient::new(format!("{}/api", server.uri()));
    api.set_token(Some("tok".into()));
    api
}

#[tokio::test]
async fn update_status_sends_status_query_and_event() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/batches/9/status"))
        .and(query_param("status", "IN_TRANSIT"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "batchCode": "APL-1", "productId": 1, "quantity": 10, "status": "IN_TRANSIT"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = ActionForm {
        event_type: "SHIPPED".into(),
        location: "Dambulla DC".into(),
        ..Default::default()
    };
    let plan = plan_submission(RoleAction::UpdateStatus, Some(9), "IN_STORAGE", &form).unwrap();
    let ActionSubmission::UpdateStatus { batch_id, status, event } = plan else {
        panic!("expected a status update");
    };
    let batch = api(&server)
        .batches()
        .update_status(batch_id, &status, &event)
        .await
        .unwrap();
    assert_eq!(batch.status_str(), "IN_TRANSIT");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["eventType"], "SHIPPED");
    assert_eq!(sent["location"], "Dambulla DC");
    assert!(sent.get("temperature").is_none());
}

#[tokio::test]
async fn add_event_posts_to_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batches/4/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 77, "batchId": 4, "eventType": "QUALITY_CHECK",
            "timestamp": "2024-05-01T09:15:30.123", "blockchainTxHash": "0x1234567890abcdef1234"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let saved = api(&server)
        .batches()
        .add_event(4, &BatchEvent::new("QUALITY_CHECK"))
        .await
        .unwrap();
    assert_eq!(saved.id, Some(77));
    assert_eq!(saved.short_tx_hash().as_deref(), Some("0x123456…1234"));
}

#[tokio::test]
async fn expiring_and_paged_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches/expiring"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/paged"))
        .and(query_param("page", "0"))
        .and(query_param("size", "10"))
        .and(query_param("sortBy", "id"))
        .and(query_param("sortDir", "DESC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"id": 1, "name": "Red Rice", "productType": "GRAIN"}],
            "totalElements": 1, "totalPages": 1, "number": 0, "size": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    assert!(api
        .batches()
        .expiring(harvest_client::batches::DEFAULT_EXPIRING_DAYS)
        .await
        .unwrap()
        .is_empty());
    let page = api.products().paged(&ProductPageQuery::default()).await.unwrap();
    assert_eq!(page.content[0].name, "Red Rice");
}

#[tokio::test]
async fn delete_product_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/products/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    api(&server).products().delete(5).await.unwrap();
}

#[tokio::test]
async fn scan_lookup_makes_one_request_and_reports_missing_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/batches/code/NOPE-20240101-001"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Batch not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = lookup_scanned_batch(&api(&server), "https://synerharvest.com/tracking/NOPE-20240101-001")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.user_message("unused"),
        "Could not find batch with code: NOPE-20240101-001"
    );
}

#[tokio::test]
async fn scan_of_empty_payload_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let err = lookup_scanned_batch(&api(&server), "https://synerharvest.com/tracking/")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Invalid(_)));
}

#[tokio::test]
async fn journey_for_scan_and_missing_journey() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/journey/APL-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batch": {"id": 1, "batchCode": "APL-1", "productId": 2, "quantity": 5},
            "events": [{"eventType": "HARVESTED", "timestamp": "2024-03-01T06:00:00"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/public/journey/GONE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tracking = api(&server).tracking();
    let journey = tracking.journey_for_scan("  APL-1 ").await.unwrap();
    assert_eq!(journey.events.len(), 1);
    assert!(journey.product.is_none());

    let err = tracking.journey("GONE").await.unwrap_err();
    assert_eq!(err.user_message("x"), JOURNEY_NOT_FOUND);
}

#[tokio::test]
async fn analytics_summary_joins_three_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Tea"}, {"id": 2, "name": "Cinnamon"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"productId": 1, "quantity": 1, "status": "IN_TRANSIT"},
            {"productId": 1, "quantity": 1, "status": "SOLD"},
            {"productId": 2, "quantity": 1}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/batches/expiring"))
        .and(query_param("days", "14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"productId": 2, "quantity": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let analytics = api(&server).analytics();
    assert_eq!(
        analytics.summary().await,
        AnalyticsSummary {
            total_products: 2,
            total_batches: 3,
            active_shipments: 1,
            expiring_batches: 1,
        }
    );
    let statuses = analytics.batch_status_distribution().await;
    let keys: Vec<_> = statuses.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["IN_TRANSIT", "SOLD", "UNKNOWN"]);
}

#[tokio::test]
async fn analytics_degrades_to_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let analytics = api(&server).analytics();
    assert_eq!(analytics.summary().await, AnalyticsSummary::default());
    assert!(analytics.monthly_production().await.is_empty());
    assert!(analytics.environmental_data(3).await.is_empty());
}

fn weather_config(server: &MockServer, key: Option<&str>) -> ClientConfig {
    ClientConfig {
        weather_base_url: format!("{}/data/2.5", server.uri()),
        weather_geo_url: format!("{}/geo/1.0", server.uri()),
        weather_api_key: key.map(String::from),
        ..Default::default()
    }
}

#[tokio::test]
async fn weather_by_coordinates_uses_configured_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("appid", "owm-key"))
        .and(query_param("lat", "7.8731"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 300.15, "humidity": 80, "pressure": 1010},
            "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "wind": {"speed": 2.1},
            "name": "Matale"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("appid", "owm-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": [
            {"main": {"temp": 301.15}, "weather": [{"main": "Rain", "icon": "10d"}], "dt_txt": "2024-06-01 12:00:00"},
            {"main": {"temp": 295.15}, "weather": [{"main": "Clear", "icon": "01n"}], "dt_txt": "2024-06-01 21:00:00"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let weather = WeatherService::new(&weather_config(&server, Some("owm-key")));
    let at = GeoLocation::parse("7.8731,80.7718").unwrap();
    let data = weather.by_coordinates(at).await.unwrap();
    assert_eq!(data.current.temperature, 27.0);
    assert_eq!(data.current.location, "Matale");
    assert_eq!(data.forecast.len(), 1);
    assert_eq!(data.forecast[0].condition, "Rain");
}

#[tokio::test]
async fn weather_without_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let weather = WeatherService::new(&weather_config(&server, None));
    let err = weather.current(GeoLocation::new(1.0, 2.0)).await.unwrap_err();
    assert!(matches!(err, ClientError::Invalid(_)));
}

#[tokio::test]
async fn unknown_location_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let weather = WeatherService::new(&weather_config(&server, Some("k")));
    let err = weather.by_location("Atlantis").await.unwrap_err();
    assert_eq!(err.user_message("Failed to fetch weather data"), "Location not found");
}
