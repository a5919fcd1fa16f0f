use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failures that happen before a response status is available
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One outbound call, relative to the transport's base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and decoded JSON body. Empty bodies decode to `Value::Null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP seam shared by every controller built from one platform handle.
///
/// Implementations must not mutate shared state per call: headers arrive fully
/// resolved on each `ApiRequest`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL every request path is appended to, e.g. `https://api.example.com/api`
    fn base_url(&self) -> &str;

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport bound to `{protocol}://{domain}/api`
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    log_requests: bool,
}

impl HttpTransport {
    pub fn new(protocol: &str, domain: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = format!("{}://{}/api", protocol, domain.trim_end_matches('/'));
        Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            log_requests: false,
        })
    }

    /// Log every outbound call at info level
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", joined, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path)?;
        if self.log_requests {
            tracing::info!("{} {}", request.method, url);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Request(e)
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                // Error pages are often HTML; keep the status and let the caller fall back
                Err(_) if !(200..300).contains(&status) => Value::Null,
                Err(e) => return Err(TransportError::Decode(e)),
            }
        };

        tracing::debug!("{} {} -> {}", request.method, request.path, status);

        Ok(ApiResponse { status, body })
    }
}
