// SDK error types
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthError;
use crate::client::TransportError;

/// Message surfaced when a remote error carries no usable `errors[0].message`
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong. Please try again or contact support.";

/// Normalized error for every fallible public operation.
///
/// Each variant names the SDK method that produced it so callers can branch on the
/// failure without parsing messages.
#[derive(Debug, Clone, Error)]
pub enum SdkError {
    // Raised locally, before dispatch
    #[error("{sdk_method}: {source}")]
    Authorization {
        sdk_method: &'static str,
        #[source]
        source: AuthError,
    },

    // Raised locally, before dispatch
    #[error("{sdk_method}: {message}")]
    Validation {
        sdk_method: &'static str,
        message: String,
        params: Value,
    },

    // Non-2xx response or transport failure
    #[error("{sdk_method}: {message}")]
    Remote {
        sdk_method: &'static str,
        message: String,
        status: Option<u16>,
        params: Value,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SdkError {
    pub fn authorization(sdk_method: &'static str, source: AuthError) -> Self {
        SdkError::Authorization { sdk_method, source }
    }

    pub fn validation(sdk_method: &'static str, message: impl Into<String>, params: Value) -> Self {
        SdkError::Validation {
            sdk_method,
            message: message.into(),
            params,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        SdkError::Config(message.into())
    }

    /// Build a remote error from a non-2xx response body
    pub fn from_response(sdk_method: &'static str, status: u16, body: &Value, params: Value) -> Self {
        SdkError::Remote {
            sdk_method,
            message: extract_error_message(body),
            status: Some(status),
            params,
        }
    }

    /// Build a remote error from a failure that never produced a response
    pub fn from_transport(sdk_method: &'static str, err: &TransportError, params: Value) -> Self {
        SdkError::Remote {
            sdk_method,
            message: err.to_string(),
            status: None,
            params,
        }
    }

    pub fn sdk_method(&self) -> Option<&'static str> {
        match self {
            SdkError::Authorization { sdk_method, .. }
            | SdkError::Validation { sdk_method, .. }
            | SdkError::Remote { sdk_method, .. } => Some(*sdk_method),
            SdkError::Config(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SdkError::Authorization { source, .. } => source.to_string(),
            SdkError::Validation { message, .. } | SdkError::Remote { message, .. } => message.clone(),
            SdkError::Config(message) => message.clone(),
        }
    }

    pub fn params(&self) -> Value {
        match self {
            SdkError::Validation { params, .. } | SdkError::Remote { params, .. } => params.clone(),
            _ => Value::Null,
        }
    }

    /// HTTP status of the remote response, if there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::Remote { status, .. } => *status,
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SdkError::Authorization { .. } => "AUTHORIZATION_ERROR",
            SdkError::Validation { .. } => "VALIDATION_ERROR",
            SdkError::Remote { status: Some(_), .. } => "REMOTE_ERROR",
            SdkError::Remote { status: None, .. } => "TRANSPORT_ERROR",
            SdkError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, SdkError::Authorization { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SdkError::Validation { .. })
    }

    /// Render as `{ message, sdkMethod, params }` plus a code for client handling
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "message": self.message(),
            "sdkMethod": self.sdk_method(),
            "params": self.params(),
            "code": self.error_code(),
        });

        if let Some(status) = self.status_code() {
            response["status"] = json!(status);
        }

        response
    }
}

/// Pull `errors[0].message` out of a platform error body
pub fn extract_error_message(body: &Value) -> String {
    body.get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}
