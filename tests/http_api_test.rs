//! HttpApi against a mock biobank server

use biobank::adapters::api::{BiobankApi, HttpApi};
use biobank::config::{secret_string, ApiConfig};
use biobank::domain::{
    ApiError, BiobankError, ConcurrencySafeEntity, ListOptions, Shipment, ShipmentId,
};
use chrono::{TimeZone, Utc};
use mockito::Matcher;
use serde_json::json;

fn api_for(server: &mockito::ServerGuard, token: Option<&str>) -> HttpApi {
    let config = ApiConfig {
        base_url: format!("{}/api", server.url()),
        auth_token: token.map(|t| secret_string(t.to_string())),
        ..Default::default()
    };
    HttpApi::new(&config).unwrap()
}

fn shipment_body(state: &str, version: u64) -> serde_json::Value {
    json!({
        "id": "s1",
        "version": version,
        "timeAdded": "2024-01-01T00:00:00Z",
        "state": state,
        "courierName": "FedEx",
        "trackingNumber": "T1",
        "fromLocationInfo": { "centreId": "c1", "locationId": "l1", "name": "c1: l1" },
        "toLocationInfo": { "centreId": "c2", "locationId": "l2", "name": "c2: l2" }
    })
}

#[tokio::test]
async fn test_success_envelope_is_unwrapped() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/shipments/s1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "status": "success", "data": { "id": "s1" } }).to_string())
        .create_async()
        .await;

    let api = api_for(&server, None);
    let reply = api.get("/shipments/s1", &Vec::new()).await.unwrap();

    assert_eq!(reply, json!({ "id": "s1" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_envelope_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/users/u1")
        .with_status(200)
        .with_body(r#"{"status":"error","message":"user not found"}"#)
        .create_async()
        .await;

    let api = api_for(&server, None);
    let err = api.get("/users/u1", &Vec::new()).await.unwrap_err();

    assert!(matches!(
        err,
        BiobankError::Api(ApiError::ErrorEnvelope(ref m)) if m == "user not found"
    ));
}

#[tokio::test]
async fn test_conflict_status_maps_to_conflict() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/shipments/state/packed/s1")
        .with_status(409)
        .with_body(r#"{"status":"error","message":"expected version doesn't match"}"#)
        .create_async()
        .await;

    let api = api_for(&server, None);
    let mut shipment = Shipment::create(shipment_body("created", 0)).unwrap();
    let before = shipment.clone();

    let err = shipment
        .pack(&api, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(shipment, before);
}

#[tokio::test]
async fn test_client_and_server_errors_are_classified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/shipments/s1/0")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;
    server
        .mock("GET", "/api/centres/c1")
        .with_status(503)
        .create_async()
        .await;

    let api = api_for(&server, None);

    let err = api.delete("/shipments/s1/0").await.unwrap_err();
    assert!(matches!(
        err,
        BiobankError::Api(ApiError::ClientError { status: 404, ref message }) if message == "not found"
    ));

    let err = api.get("/centres/c1", &Vec::new()).await.unwrap_err();
    assert!(matches!(
        err,
        BiobankError::Api(ApiError::ServerError { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/shipments/s1")
        .match_header("authorization", "Bearer t0ken")
        .with_status(200)
        .with_body(shipment_body("created", 0).to_string())
        .create_async()
        .await;

    let api = api_for(&server, Some("t0ken"));
    let shipment = Shipment::get(&api, &ShipmentId::new("s1").unwrap())
        .await
        .unwrap();

    assert!(shipment.is_created());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/shipments/s1/3")
        .with_status(200)
        .create_async()
        .await;

    let api = api_for(&server, None);
    let reply = api.delete("/shipments/s1/3").await.unwrap();

    assert!(reply.is_null());
}

#[tokio::test]
async fn test_unparseable_body_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/shipments/s1")
        .with_status(200)
        .with_body("<html>")
        .create_async()
        .await;

    let api = api_for(&server, None);
    let err = api.get("/shipments/s1", &Vec::new()).await.unwrap_err();

    assert!(matches!(err, BiobankError::Api(ApiError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_transition_posts_expected_version() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/shipments/state/sent/s1")
        .match_body(Matcher::PartialJson(json!({
            "expectedVersion": 1,
            "datetime": "2024-02-02T00:00:00Z"
        })))
        .with_status(200)
        .with_body(
            json!({ "status": "success", "data": shipment_body("sent", 2) }).to_string(),
        )
        .create_async()
        .await;

    let api = api_for(&server, None);
    let mut shipment = Shipment::create(shipment_body("packed", 1)).unwrap();

    shipment
        .send(&api, Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap())
        .await
        .unwrap();

    assert!(shipment.is_sent());
    assert_eq!(shipment.version(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_sends_query_parameters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/shipments/list/c1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter".into(), "courierName::FedEx".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "data": {
                    "items": [shipment_body("created", 0)],
                    "total": 11,
                    "page": 2,
                    "limit": 10,
                    "offset": 10,
                    "maxPages": 2
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = api_for(&server, None);
    let options = ListOptions::new().filter("courierName::FedEx").page(2);
    let page = Shipment::list(&api, &"c1".parse().unwrap(), &options)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 11);
    assert_eq!(page.max_pages, 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_server_is_connection_failure() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1/api".to_string(),
        connect_timeout_seconds: 1,
        timeout_seconds: 2,
        ..Default::default()
    };
    let api = HttpApi::new(&config).unwrap();

    let err = api.get("/shipments/s1", &Vec::new()).await.unwrap_err();

    assert!(matches!(
        err,
        BiobankError::Api(ApiError::ConnectionFailed(_) | ApiError::Timeout(_))
    ));
}
