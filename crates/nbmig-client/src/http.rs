//! reqwest implementation of [`NetboxApi`]

use crate::api::{ApiRequest, ApiResponse, Method, NetboxApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

/// Token-authenticated HTTP client for one NetBox instance
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Build a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Token {}", config.token))
            .map_err(|e| ClientError::InvalidConfig(format!("token is not a valid header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            client,
        })
    }
}

#[async_trait]
impl NetboxApi for HttpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let ApiRequest {
            method,
            url,
            query,
            body,
        } = request;

        debug!(method = %method, url = %url, "Sending request");

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
        };
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::transport(&url, e.to_string()))?;

        trace!(status, bytes = text.len(), "Received response");

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { url, status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        let result = HttpClient::new(ClientConfig::new("ftp://nb", "t"));
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn new_rejects_token_with_newline() {
        let result = HttpClient::new(ClientConfig::new("http://nb", "bad\ntoken"));
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = HttpClient::new(ClientConfig::new("http://nb.local/", "t")).unwrap();
        assert_eq!(client.base_url(), "http://nb.local");
        assert_eq!(
            client.collection_url("dcim/sites"),
            "http://nb.local/api/dcim/sites/"
        );
    }
}
