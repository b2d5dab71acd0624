//! WireMock-based Ferrellgas portal mock.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use tankgauge_core::Credentials;
use tankgauge_fetch::HttpClient;
use tankgauge_providers::FerrellgasPipeline;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

pub const TOKEN: &str = "test-token";
pub const ACCOUNT_ID: &str = "A100";

/// Mock Ferrellgas portal.
pub struct MockFerrellgasServer {
    pub server: MockServer,
}

impl MockFerrellgasServer {
    /// Starts a server that accepts any login.
    pub async fn start() -> Self {
        let mock = Self::start_without_login().await;
        mock.mock_login(json!({"success": true, "accessToken": TOKEN}))
            .await;
        mock
    }

    /// Starts a server with no endpoints mounted.
    pub async fn start_without_login() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn pipeline(&self) -> FerrellgasPipeline {
        let http = Arc::new(HttpClient::new().unwrap());
        FerrellgasPipeline::with_base_url(http, self.server.uri())
    }

    pub async fn mock_login(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/Auth/Login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_get(&self, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_summary(&self, body: Value) {
        self.mock_get(
            &format!("/api/AccountSummary/{ACCOUNT_ID}"),
            ResponseTemplate::new(200).set_body_json(body),
        )
        .await;
    }

    pub async fn mock_orders(&self, installed_product_id: &str, body: Value) {
        self.mock_get(
            &format!("/api/Order/IP/{installed_product_id}"),
            ResponseTemplate::new(200).set_body_json(body),
        )
        .await;
    }

    pub async fn mock_order_detail(&self, order_id: &str, body: Value) {
        self.mock_get(
            &format!("/api/Order/{order_id}"),
            ResponseTemplate::new(200).set_body_json(body),
        )
        .await;
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("user@example.com", "hunter2")
}

/// Account summary with two tanks at one site.
pub fn two_tank_summary() -> Value {
    json!({
        "Name": "Jane Doe",
        "FinancialSummary": {"Balance": -15.75},
        "SiteSummary": [{
            "SiteId": "S1",
            "SiteName": "Lake House",
            "IPSummary": [
                {
                    "InstalledProductId": "IP1",
                    "ProductDescription": "500 Gal Tank",
                    "ProductId": "P500",
                    "FullCapacity": 500,
                    "FillCapacity": 450,
                    "EstCurrPct": 40,
                    "EstimatedPercentageDate": "2024-02-01T08:00:00Z"
                },
                {
                    "InstalledProductId": "IP2",
                    "ProductDescription": "120 Gal Tank",
                    "FullCapacity": 120,
                    "FillCapacity": 96,
                    "EstCurrPct": 55.5,
                    "EstimatedPercentageDate": "2024-02-01"
                }
            ]
        }]
    })
}

/// Order detail for a propane delivery.
pub fn delivery_detail(order_id: &str) -> Value {
    json!({
        "OrderId": order_id,
        "OrderDate": "2024-01-10T09:00:00Z",
        "CompleteDate": "2024-01-12T15:30:00Z",
        "Status": "Complete",
        "ServiceDescription": "Propane Delivery",
        "GrandTotal": 612.34,
        "TotalTax": 12.1,
        "Lines": [
            {"Product": "PROPANE", "Quantity": 230.5, "UnitOfMeasure": "GAL", "UnitPrice": 2.5, "TotalPrice": 576.25},
            {"Product": "FUEL_SURCHARGE", "Quantity": 1, "UnitOfMeasure": "EA", "UnitPrice": 9.99, "TotalPrice": 9.99},
            {"Product": "HAZMAT_FEE", "Quantity": 1, "UnitOfMeasure": "EA", "UnitPrice": 4.95, "TotalPrice": 4.95}
        ]
    })
}
