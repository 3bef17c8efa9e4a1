//! Wire-level request/response types and the transport seam
//!
//! [`Transport`] sends exactly one request. Policy such as retries lives in
//! [`super::RetryingClient`], which wraps any transport.

use crate::error::HttpError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// JSON:API media type
pub const JSON_API: &str = "application/vnd.api+json";

/// HTTP methods used against the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read
    Get,
    /// Create
    Post,
    /// Partial update
    Patch,
    /// Remove
    Delete,
}

impl Method {
    /// Whether the method changes remote state
    #[inline]
    #[must_use]
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }

    /// Repeating the request leaves the server in the same state
    #[inline]
    #[must_use]
    pub fn is_idempotent(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }

    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// An outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Method
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET request
    #[inline]
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// POST request with JSON body
    #[inline]
    #[must_use]
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    /// PATCH request with JSON body
    #[inline]
    #[must_use]
    pub fn patch(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Patch, url).with_body(body)
    }

    /// DELETE request
    #[inline]
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// With query parameter
    #[inline]
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// With JSON body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response of any status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Status code
    pub status: u16,
    /// Raw body
    pub body: String,
    /// Parsed `Retry-After` header, seconds form only
    pub retry_after: Option<Duration>,
}

impl ApiResponse {
    /// Create response
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// With `Retry-After`
    #[inline]
    #[must_use]
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// 2xx
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// `HttpError::Decode` if the body does not match `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    /// Decode the body, requiring a 2xx status first
    ///
    /// # Errors
    /// - `HttpError::Status` for non-2xx responses
    /// - `HttpError::Decode` if the body does not match `T`
    pub fn success_json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        if !self.is_success() {
            return Err(HttpError::Status {
                status: self.status,
                body: self.body.clone(),
            });
        }
        self.json()
    }

    /// `errors[0].detail` from a JSON:API error document
    #[must_use]
    pub fn first_error_detail(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value
            .get("errors")?
            .get(0)?
            .get("detail")?
            .as_str()
            .map(str::to_string)
    }
}

/// Sends a single request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send and return whatever status came back
    ///
    /// # Errors
    /// `HttpError::Transport` when no response was received
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError>;
}

/// Transport backed by `reqwest` with bearer authentication
pub struct ReqwestTransport {
    client: reqwest::Client,
    token: String,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Create transport
    ///
    /// # Errors
    /// `HttpError::Client` if the TLS backend cannot be initialised
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self {
            client,
            token: token.into(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &request.url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_API));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| HttpError::Decode(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            body,
            retry_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_is_read_only() {
        assert!(!Method::Get.is_mutating());
        assert!(Method::Post.is_mutating());
        assert!(Method::Patch.is_mutating());
        assert!(Method::Delete.is_mutating());
    }

    #[test]
    fn only_get_and_delete_are_idempotent() {
        assert!(Method::Get.is_idempotent());
        assert!(Method::Delete.is_idempotent());
        assert!(!Method::Post.is_idempotent());
        assert!(!Method::Patch.is_idempotent());
    }

    #[test]
    fn request_builders() {
        let request = ApiRequest::get("https://x/api/v2/organizations")
            .with_query("page[number]", 2)
            .with_query("page[size]", 100);

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query[0], ("page[number]".to_string(), "2".to_string()));
        assert!(request.body.is_none());

        let request = ApiRequest::post("https://x", serde_json::json!({"a": 1}));
        assert_eq!(request.body, Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn first_error_detail_reads_json_api_errors() {
        let response = ApiResponse::new(
            422,
            r#"{"errors":[{"status":"422","detail":"Name has already been taken"}]}"#,
        );
        assert_eq!(
            response.first_error_detail().as_deref(),
            Some("Name has already been taken")
        );

        assert_eq!(ApiResponse::new(500, "oops").first_error_detail(), None);
    }

    #[test]
    fn success_json_rejects_error_status() {
        let response = ApiResponse::new(404, "not found");
        let result: Result<serde_json::Value, _> = response.success_json();
        assert!(matches!(result, Err(HttpError::Status { status: 404, .. })));
    }
}
