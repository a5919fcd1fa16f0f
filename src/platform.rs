use std::sync::Arc;
use std::time::Duration;

use crate::auth::Credentials;
use crate::authorizer::RequestAuthorizer;
use crate::client::{HttpTransport, Transport};
use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::is_production;

/// Everything needed to build a platform handle
#[derive(Debug, Clone)]
pub struct PlatformOptions {
    pub api_domain: String,
    pub api_protocol: String,
    pub api_key: Option<String>,
    pub interactive_key: Option<String>,
    pub interactive_secret: Option<String>,
    pub timeout: Duration,
    pub log_requests: bool,
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self {
            api_domain: "api.vworld.dev".to_string(),
            api_protocol: "https".to_string(),
            api_key: None,
            interactive_key: None,
            interactive_secret: None,
            timeout: Duration::from_secs(30),
            log_requests: false,
        }
    }
}

impl PlatformOptions {
    pub fn from_config(config: &SdkConfig) -> Self {
        if is_production!() && config.api.protocol != "https" {
            tracing::warn!("Production SDK configured with protocol '{}'", config.api.protocol);
        }

        Self {
            api_domain: config.api.domain.clone(),
            api_protocol: config.api.protocol.clone(),
            api_key: config.credentials.api_key.clone(),
            interactive_key: config.credentials.interactive_key.clone(),
            interactive_secret: config.credentials.interactive_secret.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            log_requests: config.api.log_requests,
        }
    }
}

/// Shared handle holding the base domain, default credentials and the transport.
///
/// Cloning is cheap; every controller built from one handle shares the same
/// authorizer and transport.
#[derive(Clone)]
pub struct Platform {
    api_domain: String,
    credentials: Credentials,
    authorizer: Arc<RequestAuthorizer>,
}

impl Platform {
    /// Build a handle backed by the reqwest transport
    pub fn new(options: PlatformOptions) -> Result<Self, SdkError> {
        let transport = HttpTransport::new(&options.api_protocol, &options.api_domain, options.timeout)
            .map_err(|e| SdkError::config(e.to_string()))?
            .with_request_logging(options.log_requests);

        tracing::info!("Platform handle bound to {}", transport.base_url());

        Ok(Self::with_transport(options, Arc::new(transport)))
    }

    /// Build a handle from the process-wide environment config
    pub fn from_env() -> Result<Self, SdkError> {
        Self::new(PlatformOptions::from_config(crate::config::config()))
    }

    /// Build a handle around any transport implementation
    pub fn with_transport(options: PlatformOptions, transport: Arc<dyn Transport>) -> Self {
        let credentials = Credentials {
            api_key: options.api_key,
            interactive_public_key: options.interactive_key,
            ..Credentials::default()
        };

        Self {
            api_domain: options.api_domain,
            credentials,
            authorizer: Arc::new(RequestAuthorizer::new(transport, options.interactive_secret)),
        }
    }

    pub fn api_domain(&self) -> &str {
        &self.api_domain
    }

    /// Default credentials controllers inherit
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn authorizer(&self) -> &RequestAuthorizer {
        &self.authorizer
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("api_domain", &self.api_domain)
            .field("base_url", &self.authorizer.transport().base_url())
            .field("credentials", &self.credentials)
            .finish()
    }
}
