//! The request/response seam between the reconciliation engine and a NetBox
//! instance

use crate::error::ClientError;
use crate::url::collection_url;
use async_trait::async_trait;
use serde_json::Value;

/// HTTP verbs the engine issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
            Self::Patch => f.write_str("PATCH"),
        }
    }
}

/// One request against an absolute URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Verb
    pub method: Method,
    /// Absolute URL, possibly already carrying a query string
    pub url: String,
    /// Extra query parameters
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl ApiRequest {
    /// GET request
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// POST request with body
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// PATCH request with body
    #[must_use]
    pub fn patch(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Add query parameters
    #[must_use]
    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        self.query
            .extend(query.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        self
    }
}

/// Status and body returned by the server
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// URL the response came from
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body; non-JSON bodies are kept as a string value
    pub body: Value,
}

impl ApiResponse {
    /// Whether the status is 2xx
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`ClientError::Status`]
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            return Ok(self);
        }
        let body = match self.body {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Err(ClientError::Status {
            status: self.status,
            url: self.url,
            body,
        })
    }

    /// `results` array of a listing response
    #[must_use]
    pub fn results(&self) -> &[Value] {
        self.body
            .get("results")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }
}

/// Capability to talk to one NetBox instance
///
/// Implementors only provide [`NetboxApi::base_url`] and [`NetboxApi::send`];
/// `send` returns `Ok` for every response the server produced, whatever its
/// status.
#[async_trait]
pub trait NetboxApi: Send + Sync {
    /// Base URL of the instance, without `/api`
    fn base_url(&self) -> &str;

    /// Issue one request
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;

    /// Collection URL on this instance
    fn collection_url(&self, endpoint: &str) -> String {
        collection_url(self.base_url(), endpoint)
    }

    /// GET and require a 2xx status
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let response = self
            .send(ApiRequest::get(url).with_query(query))
            .await?
            .error_for_status()?;
        Ok(response.body)
    }

    /// First `results` item of a filtered listing, if any
    async fn find_first(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, ClientError> {
        let body = self.get_json(url, query).await?;
        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .cloned())
    }

    /// POST and require a 2xx status
    async fn post_json(&self, url: &str, body: Value) -> Result<Value, ClientError> {
        let response = self
            .send(ApiRequest::post(url, body))
            .await?
            .error_for_status()?;
        Ok(response.body)
    }

    /// PATCH and require a 2xx status
    async fn patch_json(&self, url: &str, body: Value) -> Result<Value, ClientError> {
        let response = self
            .send(ApiRequest::patch(url, body))
            .await?
            .error_for_status()?;
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            url: "http://nb/api/dcim/sites/".to_string(),
            status,
            body,
        }
    }

    #[test]
    fn error_for_status_keeps_body_text() {
        let err = response(404, json!("Not Found")).error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("Not Found"));

        let err = response(400, json!({"name": ["required"]}))
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.body(), Some("{\"name\":[\"required\"]}"));

        assert!(response(201, json!({})).error_for_status().is_ok());
    }

    #[test]
    fn results_of_listing() {
        let listing = response(200, json!({"count": 1, "results": [{"id": 3}]}));
        assert_eq!(listing.results(), &[json!({"id": 3})]);
        assert!(response(200, json!({})).results().is_empty());
    }

    #[test]
    fn request_builders() {
        let request = ApiRequest::get("http://nb/api/dcim/sites/").with_query(&[("slug", "ams1")]);
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query, vec![("slug".to_string(), "ams1".to_string())]);
        assert!(request.body.is_none());

        let request = ApiRequest::patch("http://nb/api/dcim/devices/1/", json!({"a": 1}));
        assert_eq!(request.method.to_string(), "PATCH");
        assert_eq!(request.body, Some(json!({"a": 1})));
    }
}
