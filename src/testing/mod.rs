use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::platform::{Platform, PlatformOptions};

/// In-memory transport that records every request and answers from canned routes
pub struct RecordingTransport {
    calls: Mutex<Vec<ApiRequest>>,
    routes: Mutex<Vec<Route>>,
}

struct Route {
    method: Method,
    path: String,
    status: u16,
    body: Value,
    delay: Duration,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            routes: Mutex::new(Vec::new()),
        }
    }

    /// Answer `method path` with `status` and `body`; later routes win
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.respond_after(method, path, status, body, Duration::ZERO)
    }

    pub fn respond_after(&self, method: Method, path: &str, status: u16, body: Value, delay: Duration) -> &Self {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            status,
            body,
            delay,
        });
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.path == path)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn base_url(&self) -> &str {
        "http://recording.test/api"
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let (status, body, delay) = {
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .rev()
                .find(|route| route.method == request.method && route.path == request.path)
                .map(|route| (route.status, route.body.clone(), route.delay))
                .unwrap_or((200, Value::Null, Duration::ZERO))
        };

        self.calls.lock().unwrap().push(request);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(ApiResponse { status, body })
    }
}

/// Platform handle wired to a recording transport, authorized by API key
pub fn recording_platform() -> (Platform, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let options = PlatformOptions {
        api_key: Some("test-api-key".to_string()),
        ..PlatformOptions::default()
    };
    let platform = Platform::with_transport(options, transport.clone());
    (platform, transport)
}

/// Platform handle with no default credentials at all
pub fn anonymous_platform() -> (Platform, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let platform = Platform::with_transport(PlatformOptions::default(), transport.clone());
    (platform, transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unmatched_requests_default_to_ok() {
        let transport = RecordingTransport::new();
        let response = transport.send(ApiRequest::get("anything")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn later_routes_override_earlier_ones() {
        let transport = RecordingTransport::new();
        transport
            .respond(Method::GET, "world/a", 200, serde_json::json!({ "v": 1 }))
            .respond(Method::GET, "world/a", 404, Value::Null);

        let response = transport.send(ApiRequest::get("world/a")).await.unwrap();
        assert_eq!(response.status, 404);
    }
}
