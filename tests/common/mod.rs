#![allow(dead_code)]

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use vworld_sdk::{Platform, PlatformOptions};
use wiremock::MockServer;

pub const API_KEY: &str = "integration-api-key";
pub const INTERACTIVE_SECRET: &str = "integration-secret";

/// Mock platform API plus an SDK handle pointed at it
pub struct TestApi {
    pub server: MockServer,
    pub platform: Platform,
}

impl TestApi {
    /// Handle authorized by API key
    pub async fn start() -> Result<Self> {
        Self::start_with(|options| {
            options.api_key = Some(API_KEY.to_string());
        })
        .await
    }

    /// Handle with no default credentials
    pub async fn start_anonymous() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut PlatformOptions)) -> Result<Self> {
        let server = MockServer::start().await;

        let mut options = PlatformOptions {
            api_domain: server.address().to_string(),
            api_protocol: "http".to_string(),
            interactive_secret: Some(INTERACTIVE_SECRET.to_string()),
            timeout: Duration::from_secs(5),
            ..PlatformOptions::default()
        };
        configure(&mut options);

        let platform = Platform::new(options)?;
        Ok(Self { server, platform })
    }

    /// Requests the mock server has seen so far
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    pub async fn request_count(&self) -> usize {
        self.requests().await.len()
    }
}

pub fn body_json(request: &wiremock::Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}
