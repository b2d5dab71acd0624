//! Ferrellgas API client.
//!
//! Thin wrapper over [`HttpClient`] that knows the portal's endpoints and
//! the login handshake. Every public call authenticates with a bearer token
//! obtained from [`FerrellgasApiClient::login`]; tokens are never cached.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tankgauge_core::Credentials;
use tankgauge_fetch::{HttpClient, bearer_headers};
use tracing::{debug, instrument};

use super::error::FerrellgasError;
use super::parser::{as_text, is_truthy};

// ============================================================================
// Constants
// ============================================================================

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://bff.myferrellgas.com";

/// Login endpoint.
const LOGIN_ENDPOINT: &str = "/api/Auth/Login/";

/// Current user endpoint.
const USER_ME_ENDPOINT: &str = "/api/User/me";

/// Account summary endpoint (suffixed with the account id).
const ACCOUNT_SUMMARY_ENDPOINT: &str = "/api/AccountSummary/";

/// Orders-by-installed-product endpoint (suffixed with the product id).
const ORDERS_BY_PRODUCT_ENDPOINT: &str = "/api/Order/IP/";

/// Order detail endpoint (suffixed with the order id).
const ORDER_ENDPOINT: &str = "/api/Order/";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "changePwd")]
    change_pwd: bool,
    #[serde(rename = "newPassword")]
    new_password: &'a str,
    #[serde(rename = "ReturnUrl")]
    return_url: &'a str,
}

// ============================================================================
// API Client
// ============================================================================

/// Ferrellgas API client.
#[derive(Debug, Clone)]
pub struct FerrellgasApiClient {
    http: Arc<HttpClient>,
    base_url: String,
}

impl FerrellgasApiClient {
    /// Creates a client against the production API.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL.
    pub fn with_base_url(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges credentials for an access token.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<String, FerrellgasError> {
        debug!("Logging in");

        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
            change_pwd: false,
            new_password: "",
            return_url: "",
        };

        let response = self
            .http
            .post_json(&self.url(LOGIN_ENDPOINT), &request)
            .await?;

        token_from_login_response(&response)
    }

    /// Lists the account ids visible to the logged-in user.
    #[instrument(skip(self, token))]
    pub async fn account_ids(&self, token: &str) -> Result<Vec<String>, FerrellgasError> {
        let body = self
            .http
            .get_json(&self.url(USER_ME_ENDPOINT), bearer_headers(token)?)
            .await?;

        match body.get("Accounts") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()),
            Some(_) => Err(FerrellgasError::Api(
                "Unexpected response type for Accounts".to_string(),
            )),
        }
    }

    /// Fetches the raw account summary payload.
    #[instrument(skip(self, token))]
    pub async fn account_summary(
        &self,
        token: &str,
        account_id: &str,
    ) -> Result<Map<String, Value>, FerrellgasError> {
        let url = self.url(&format!("{ACCOUNT_SUMMARY_ENDPOINT}{account_id}"));
        Ok(self.http.get_json(&url, bearer_headers(token)?).await?)
    }

    /// Fetches the order summaries for one installed product.
    #[instrument(skip(self, token))]
    pub async fn order_list(
        &self,
        token: &str,
        installed_product_id: &str,
    ) -> Result<Vec<Map<String, Value>>, FerrellgasError> {
        let url = self.url(&format!("{ORDERS_BY_PRODUCT_ENDPOINT}{installed_product_id}"));
        Ok(self.http.get_json_list(&url, bearer_headers(token)?).await?)
    }

    /// Fetches one order's full detail payload.
    #[instrument(skip(self, token))]
    pub async fn order_detail(
        &self,
        token: &str,
        order_id: &str,
    ) -> Result<Map<String, Value>, FerrellgasError> {
        let url = self.url(&format!("{ORDER_ENDPOINT}{order_id}"));
        Ok(self.http.get_json(&url, bearer_headers(token)?).await?)
    }
}

/// Extracts the access token from a login response body.
pub(crate) fn token_from_login_response(
    response: &Map<String, Value>,
) -> Result<String, FerrellgasError> {
    if !is_truthy(response.get("success")) {
        let message = response
            .get("error")
            .filter(|v| is_truthy(Some(*v)))
            .and_then(|v| as_text(Some(v)))
            .unwrap_or_else(|| "Login failed".to_string());
        return Err(FerrellgasError::AuthenticationFailed(message));
    }

    match response.get("accessToken") {
        Some(Value::String(token)) if !token.is_empty() => Ok(token.clone()),
        _ => Err(FerrellgasError::AuthenticationFailed(
            "Login succeeded but access token missing".to_string(),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
