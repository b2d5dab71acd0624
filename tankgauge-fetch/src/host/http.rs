//! JSON HTTP client with tracing and response classification.
//!
//! Every call in this module returns either a decoded JSON body or a
//! [`FetchError`] that already carries its classification:
//!
//! - send failures (DNS, refused, timeout) become [`FetchError::Connection`]
//! - HTTP 401/403 become [`FetchError::AuthenticationFailed`]
//! - any other status >= 400 becomes [`FetchError::Api`] with the body text
//! - a body that is not JSON, or not the expected shape, becomes
//!   [`FetchError::Api`]

use reqwest::{
    Client, Response, StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string for `TankGauge`.
const USER_AGENT: &str = concat!("TankGauge/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Header Helpers
// ============================================================================

/// Builds the headers for an authenticated API call.
pub fn bearer_headers(token: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| FetchError::InvalidRequest(format!("Invalid bearer token: {e}")))?;
    headers.insert(header::AUTHORIZATION, value);
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper that speaks JSON and classifies failures.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with the default 30 second timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::InvalidRequest(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { inner: client })
    }

    /// Performs a GET and returns the body as a JSON object.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_json(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Map<String, Value>, FetchError> {
        debug!("GET request");
        let response = self
            .inner
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(connection_error)?;

        match read_json(response).await? {
            Value::Object(map) => Ok(map),
            other => {
                debug!(kind = json_kind(&other), "Expected JSON object");
                Err(unexpected_payload())
            }
        }
    }

    /// Performs a GET and returns the body as a list of JSON objects.
    ///
    /// A single object is accepted and wrapped as a one-element list.
    /// Non-object entries inside an array are skipped.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_json_list(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Vec<Map<String, Value>>, FetchError> {
        debug!("GET list request");
        let response = self
            .inner
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(connection_error)?;

        match read_json(response).await? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            Value::Object(map) => Ok(vec![map]),
            other => {
                debug!(kind = json_kind(&other), "Expected JSON list");
                Err(unexpected_payload())
            }
        }
    }

    /// Performs a POST with a JSON body and returns the response object.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Map<String, Value>, FetchError> {
        debug!("POST request with JSON");
        let response = self
            .inner
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(connection_error)?;

        match read_json(response).await? {
            Value::Object(map) => Ok(map),
            other => {
                debug!(kind = json_kind(&other), "Expected JSON object");
                Err(unexpected_payload())
            }
        }
    }
}

// ============================================================================
// Response Classification
// ============================================================================

fn connection_error(err: reqwest::Error) -> FetchError {
    warn!(error = %err, "Request failed before a response arrived");
    FetchError::Connection(err.to_string())
}

fn unexpected_payload() -> FetchError {
    FetchError::Api("API returned unexpected payload type".to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

async fn read_json(response: Response) -> Result<Value, FetchError> {
    let status = response.status();
    debug!(status = %status, "Response received");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::AuthenticationFailed(format!(
            "Authentication error: HTTP {}",
            status.as_u16()
        )));
    }

    let body = response.text().await.map_err(connection_error)?;

    if status.as_u16() >= 400 {
        return Err(FetchError::Api(format!(
            "API request failed: HTTP {} - {}",
            status.as_u16(),
            body
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        debug!(error = %e, "Response body is not JSON");
        FetchError::Api("API returned non-JSON response".to_string())
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new().unwrap()
    }

    #[test]
    fn test_bearer_headers() {
        let headers = bearer_headers("abc").unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_bearer_headers_rejects_control_chars() {
        let err = bearer_headers("bad\ntoken").unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_get_json_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/thing"))
            .and(header_matcher("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Name": "x"})))
            .mount(&server)
            .await;

        let url = format!("{}/api/thing", server.uri());
        let body = client()
            .get_json(&url, bearer_headers("tok").unwrap())
            .await
            .unwrap();
        assert_eq!(body["Name"], "x");
    }

    #[tokio::test]
    async fn test_forbidden_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = client()
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("HTTP 403"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client()
            .get_json_list(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client()
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        match err {
            FetchError::Api(msg) => assert_eq!(msg, "API request failed: HTTP 500 - boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client()
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        match err {
            FetchError::Api(msg) => assert_eq!(msg, "API returned non-JSON response"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_array_where_object_expected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .mount(&server)
            .await;

        let err = client()
            .get_json(&server.uri(), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Api(_)));
    }

    #[tokio::test]
    async fn test_list_accepts_single_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"OrderId": "1"})))
            .mount(&server)
            .await;

        let items = client()
            .get_json_list(&server.uri(), HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["OrderId"], "1");
    }

    #[tokio::test]
    async fn test_list_skips_non_objects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"OrderId": "1"}, "junk", 3])),
            )
            .mount(&server)
            .await;

        let items = client()
            .get_json_list(&server.uri(), HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_post_json_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"Username": "u"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let url = format!("{}/login", server.uri());
        let body = client()
            .post_json(&url, &json!({"Username": "u"}))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Bind then drop a server so the port is closed.
        let uri = {
            let server = MockServer::builder().start().await;
            server.uri()
        };

        let err = client().get_json(&uri, HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Connection(_)));
        assert!(err.is_transient());
    }
}
