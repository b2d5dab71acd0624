//! End-to-end pipeline tests against a mocked Ferrellgas portal.

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tankgauge_core::derive::{estimated_gallons, estimated_value, gallons_used_since_fill};
use tankgauge_core::{CoreError, SnapshotProvider};
use tankgauge_fetch::HttpClient;
use tankgauge_providers::{FerrellgasError, FerrellgasPipeline};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{ACCOUNT_ID, MockFerrellgasServer, credentials, delivery_detail, two_tank_summary};

#[tokio::test]
async fn test_full_refresh_reproduces_payload() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_summary(two_tank_summary()).await;
    mock.mock_orders(
        "IP1",
        json!([
            {"OrderId": "O1", "OrderType": "DEL", "CompleteDate": "2024-01-12T15:30:00Z", "Status": "Complete"},
            {"OrderId": "O0", "OrderType": "DEL", "CompleteDate": "2023-11-02T10:00:00Z", "Status": "Complete"}
        ]),
    )
    .await;
    mock.mock_order_detail("O1", delivery_detail("O1")).await;
    mock.mock_orders("IP2", json!([])).await;

    let snapshot = mock
        .pipeline()
        .fetch_snapshot(&credentials(), ACCOUNT_ID)
        .await
        .unwrap();

    assert_eq!(snapshot.account_id, ACCOUNT_ID);
    assert_eq!(snapshot.account_name, "Jane Doe");
    assert_eq!(snapshot.balance, Some(-15.75));
    assert_eq!(snapshot.tank_ids(), vec!["IP1", "IP2"]);

    let tank = snapshot.tank("IP1").unwrap();
    assert_eq!(tank.site_id, "S1");
    assert_eq!(tank.site_name, "Lake House");
    assert_eq!(tank.product_description, "500 Gal Tank");
    assert_eq!(tank.product_id.as_deref(), Some("P500"));
    assert_eq!(tank.full_capacity, Some(500.0));
    assert_eq!(tank.fill_capacity, Some(450.0));
    assert_eq!(tank.current_percent, Some(40.0));
    assert_eq!(
        tank.reading_timestamp,
        Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap())
    );

    let order = tank.last_delivery.as_ref().unwrap();
    assert_eq!(order.order_id, "O1");
    assert_eq!(
        order.order_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap())
    );
    assert_eq!(
        order.complete_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 12, 15, 30, 0).unwrap())
    );
    assert_eq!(order.status, "Complete");
    assert_eq!(order.service_description, "Propane Delivery");
    assert_eq!(order.grand_total, 612.34);
    assert_eq!(order.total_tax, 12.1);
    assert_eq!(order.propane_gallons, Some(230.5));
    assert_eq!(order.propane_price_per_gallon, Some(2.5));
    assert_eq!(order.propane_subtotal, Some(576.25));
    assert_eq!(order.fuel_surcharge, Some(9.99));
    assert_eq!(order.hazmat_fee, Some(4.95));
    assert_eq!(order.lines.len(), 3);

    assert_eq!(estimated_gallons(tank), Some(200.0));
    assert_eq!(estimated_value(tank), Some(500.0));
    assert_eq!(gallons_used_since_fill(tank), Some(250.0));

    let second = snapshot.tank("IP2").unwrap();
    assert!(second.last_delivery.is_none());
    assert_eq!(
        second.reading_timestamp,
        Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_enrichment_failure_is_isolated() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_summary(two_tank_summary()).await;
    mock.mock_get(
        "/api/Order/IP/IP1",
        ResponseTemplate::new(500).set_body_string("order service down"),
    )
    .await;
    mock.mock_orders(
        "IP2",
        json!({"OrderId": "O2", "OrderType": "Delivery", "CreateDate": "2024-01-03"}),
    )
    .await;
    mock.mock_order_detail("O2", delivery_detail("O2")).await;

    let snapshot = mock
        .pipeline()
        .fetch_snapshot(&credentials(), ACCOUNT_ID)
        .await
        .unwrap();

    assert_eq!(snapshot.tanks.len(), 2);
    assert!(snapshot.tank("IP1").unwrap().last_delivery.is_none());
    assert_eq!(
        snapshot
            .tank("IP2")
            .unwrap()
            .last_delivery
            .as_ref()
            .unwrap()
            .order_id,
        "O2"
    );
}

/// Mounts IP1 with a failing detail response and a healthy IP2.
async fn mount_failing_detail(mock: &MockFerrellgasServer, detail: ResponseTemplate) {
    mock.mock_summary(two_tank_summary()).await;
    mock.mock_orders(
        "IP1",
        json!([{"OrderId": "O1", "OrderType": "DEL", "CompleteDate": "2024-01-12T15:30:00Z"}]),
    )
    .await;
    mock.mock_get("/api/Order/O1", detail).await;
    mock.mock_orders(
        "IP2",
        json!([{"OrderId": "O2", "OrderType": "DEL", "CompleteDate": "2024-01-03T10:00:00Z"}]),
    )
    .await;
    mock.mock_order_detail("O2", delivery_detail("O2")).await;
}

#[tokio::test]
async fn test_order_detail_server_error_is_isolated() {
    let mock = MockFerrellgasServer::start().await;
    mount_failing_detail(&mock, ResponseTemplate::new(500).set_body_string("boom")).await;

    let snapshot = mock.pipeline().refresh(&credentials(), ACCOUNT_ID).await.unwrap();

    assert_eq!(snapshot.tank_ids(), vec!["IP1", "IP2"]);
    let first = snapshot.tank("IP1").unwrap();
    assert!(first.last_delivery.is_none());
    assert_eq!(first.current_percent, Some(40.0));
    let second = snapshot.tank("IP2").unwrap().last_delivery.as_ref().unwrap();
    assert_eq!(second.order_id, "O2");
    assert_eq!(second.propane_price_per_gallon, Some(2.5));
}

#[tokio::test]
async fn test_order_detail_not_json_is_isolated() {
    let mock = MockFerrellgasServer::start().await;
    mount_failing_detail(&mock, ResponseTemplate::new(200).set_body_string("<html>")).await;

    let snapshot = mock.pipeline().refresh(&credentials(), ACCOUNT_ID).await.unwrap();

    assert!(snapshot.tank("IP1").unwrap().last_delivery.is_none());
    assert!(snapshot.tank("IP2").unwrap().last_delivery.is_some());
}

#[tokio::test]
async fn test_unreachable_portal_is_update_failed() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let http = Arc::new(HttpClient::new().unwrap());
    let pipeline = FerrellgasPipeline::with_base_url(http, format!("http://127.0.0.1:{port}"));

    let err = pipeline.refresh(&credentials(), ACCOUNT_ID).await.unwrap_err();
    match err {
        CoreError::UpdateFailed(msg) => assert!(msg.starts_with("Connection failed"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_order_without_id_yields_no_delivery() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_summary(two_tank_summary()).await;
    mock.mock_orders("IP1", json!([{"OrderType": "DEL", "CompleteDate": "2024-01-01"}]))
        .await;
    mock.mock_get(
        "/api/Order/IP/IP2",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let snapshot = mock
        .pipeline()
        .fetch_snapshot(&credentials(), ACCOUNT_ID)
        .await
        .unwrap();

    assert!(snapshot.tanks.iter().all(|t| t.last_delivery.is_none()));
}

#[tokio::test]
async fn test_login_payload_shape() {
    let mock = MockFerrellgasServer::start_without_login().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/Login/"))
        .and(body_json(json!({
            "username": "user@example.com",
            "password": "hunter2",
            "changePwd": false,
            "newPassword": "",
            "ReturnUrl": ""
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "accessToken": common::TOKEN})),
        )
        .expect(1)
        .mount(&mock.server)
        .await;
    mock.mock_summary(json!({"Name": "Jane"})).await;

    let snapshot = mock
        .pipeline()
        .fetch_snapshot(&credentials(), ACCOUNT_ID)
        .await
        .unwrap();
    assert!(snapshot.tanks.is_empty());
}

#[tokio::test]
async fn test_login_rejected() {
    let mock = MockFerrellgasServer::start_without_login().await;
    mock.mock_login(json!({"success": false, "error": "bad creds"}))
        .await;

    let err = mock
        .pipeline()
        .fetch_snapshot(&credentials(), ACCOUNT_ID)
        .await
        .unwrap_err();
    match err {
        FerrellgasError::AuthenticationFailed(msg) => assert_eq!(msg, "bad creds"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_without_token_requires_reauth() {
    let mock = MockFerrellgasServer::start_without_login().await;
    mock.mock_login(json!({"success": true})).await;

    let err = mock
        .pipeline()
        .refresh(&credentials(), ACCOUNT_ID)
        .await
        .unwrap_err();
    assert!(err.requires_reauth());
    assert!(err.to_string().contains("access token missing"));
}

#[tokio::test]
async fn test_forbidden_summary_is_auth_error() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_get(
        &format!("/api/AccountSummary/{ACCOUNT_ID}"),
        ResponseTemplate::new(403),
    )
    .await;

    let err = mock
        .pipeline()
        .refresh(&credentials(), ACCOUNT_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Authentication(_)));
}

#[tokio::test]
async fn test_server_error_is_update_failed() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_get(
        &format!("/api/AccountSummary/{ACCOUNT_ID}"),
        ResponseTemplate::new(502).set_body_string("bad gateway"),
    )
    .await;

    let err = mock
        .pipeline()
        .refresh(&credentials(), ACCOUNT_ID)
        .await
        .unwrap_err();
    match err {
        CoreError::UpdateFailed(msg) => {
            assert!(msg.contains("HTTP 502 - bad gateway"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_accounts_are_stringified() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_get(
        "/api/User/me",
        ResponseTemplate::new(200).set_body_json(json!({"Accounts": ["A100", 200]})),
    )
    .await;

    let accounts = mock.pipeline().accounts(&credentials()).await.unwrap();
    assert_eq!(accounts, vec!["A100".to_string(), "200".to_string()]);
}

#[tokio::test]
async fn test_accounts_wrong_type_is_api_error() {
    let mock = MockFerrellgasServer::start().await;
    mock.mock_get(
        "/api/User/me",
        ResponseTemplate::new(200).set_body_json(json!({"Accounts": "A100"})),
    )
    .await;

    let err = mock
        .pipeline()
        .fetch_account_ids(&credentials())
        .await
        .unwrap_err();
    assert!(matches!(err, FerrellgasError::Api(_)));
}

#[tokio::test]
async fn test_pipeline_name() {
    let mock = MockFerrellgasServer::start_without_login().await;
    assert_eq!(mock.pipeline().name(), "Ferrellgas");
}
