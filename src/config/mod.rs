use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub credentials: CredentialConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub domain: String,
    pub protocol: String,
    pub timeout_secs: u64,
    pub log_requests: bool,
}

/// Default credentials for the platform handle. Secrets never leave the process
/// except `api_key` and `interactive_key`, which are sent as headers.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialConfig {
    pub api_key: Option<String>,
    pub interactive_key: Option<String>,
    pub interactive_secret: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("interactive_key", &self.interactive_key)
            .field("interactive_secret", &self.interactive_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

impl SdkConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("VWORLD_API_DOMAIN") {
            self.api.domain = v;
        }
        if let Ok(v) = env::var("VWORLD_API_PROTOCOL") {
            self.api.protocol = v;
        }
        if let Ok(v) = env::var("VWORLD_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("VWORLD_LOG_REQUESTS") {
            self.api.log_requests = v.parse().unwrap_or(self.api.log_requests);
        }

        // Credential overrides
        if let Ok(v) = env::var("VWORLD_API_KEY") {
            self.credentials.api_key = non_empty(v);
        }
        if let Ok(v) = env::var("VWORLD_INTERACTIVE_KEY") {
            self.credentials.interactive_key = non_empty(v);
        }
        if let Ok(v) = env::var("VWORLD_INTERACTIVE_SECRET") {
            self.credentials.interactive_secret = non_empty(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                domain: "localhost:3001".to_string(),
                protocol: "http".to_string(),
                timeout_secs: 30,
                log_requests: true,
            },
            credentials: CredentialConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                domain: "api-staging.vworld.dev".to_string(),
                protocol: "https".to_string(),
                timeout_secs: 20,
                log_requests: true,
            },
            credentials: CredentialConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                domain: "api.vworld.dev".to_string(),
                protocol: "https".to_string(),
                timeout_secs: 10,
                log_requests: false,
            },
            credentials: CredentialConfig::default(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Global singleton config - initialized once on first use
pub static CONFIG: Lazy<SdkConfig> = Lazy::new(SdkConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static SdkConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
