//! HTTP transport seam for the tracking-service client.
//!
//! The client describes requests as plain values and hands them to an
//! [`HttpTransport`]. The bundled [`ReqwestTransport`] adapts the generic
//! HTTP client; tests substitute a mock and never open a socket.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP method subset the tracking service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Idempotent read.
    Get,
    /// Event submission.
    Post,
}

/// A request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully formed request URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Build a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Build a POST request with a JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Attach a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a bearer authorization header.
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }
}

/// A decoded response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code. Always a success code; failures are errors.
    pub status: u16,
    /// Decoded JSON body, `Null` when the response had none.
    pub body: Value,
}

/// Executes [`HttpRequest`]s.
///
/// This trait allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute the request, validating the response status.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(Error::Http {
                status,
                url: request.url,
            });
        }

        // Event submissions answer with empty or irrelevant bodies.
        let body = response.json().await.unwrap_or(Value::Null);
        Ok(HttpResponse { status, body })
    }
}
