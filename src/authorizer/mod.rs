use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::sync::Arc;

use crate::auth::{sign_interactive_token, AuthError, Credentials};
use crate::client::{ApiRequest, Transport};

/// Header carrying the raw API key
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Header identifying the embedding application
pub const PUBLIC_KEY_HEADER: &str = "publickey";
/// Header carrying the signed interactive session token
pub const INTERACTIVE_JWT_HEADER: &str = "interactivejwt";

/// Turns effective credentials into the header set for one call and hands out the
/// shared transport. Performs no I/O itself.
pub struct RequestAuthorizer {
    transport: Arc<dyn Transport>,
    interactive_secret: Option<String>,
}

impl RequestAuthorizer {
    pub fn new(transport: Arc<dyn Transport>, interactive_secret: Option<String>) -> Self {
        Self {
            transport,
            interactive_secret: interactive_secret.filter(|secret| !secret.is_empty()),
        }
    }

    /// The transport bound to the platform's base domain
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn has_interactive_secret(&self) -> bool {
        self.interactive_secret.is_some()
    }

    /// Resolve the headers for one call.
    ///
    /// Both the API key and the interactive pair are attached when both are available;
    /// the platform decides precedence. Fails when neither source resolves.
    pub fn resolve_headers(&self, credentials: &Credentials) -> Result<HeaderMap, AuthError> {
        let mut headers = HeaderMap::new();

        if let Some(api_key) = credentials.api_key.as_deref().filter(|key| !key.is_empty()) {
            headers.insert(
                HeaderName::from_static(AUTHORIZATION_HEADER),
                header_value(AUTHORIZATION_HEADER, api_key)?,
            );
        }

        if let Some(public_key) = credentials
            .interactive_public_key
            .as_deref()
            .filter(|key| !key.is_empty())
        {
            headers.insert(
                HeaderName::from_static(PUBLIC_KEY_HEADER),
                header_value(PUBLIC_KEY_HEADER, public_key)?,
            );
        }

        if let (Some(secret), Some(claims)) = (&self.interactive_secret, credentials.interactive_claims()) {
            let token = sign_interactive_token(&claims, secret)?;
            headers.insert(
                HeaderName::from_static(INTERACTIVE_JWT_HEADER),
                header_value(INTERACTIVE_JWT_HEADER, &token)?,
            );
        }

        let has_api_key = headers.contains_key(AUTHORIZATION_HEADER);
        let has_public_key = headers.contains_key(PUBLIC_KEY_HEADER);
        let has_interactive_pair = has_public_key && headers.contains_key(INTERACTIVE_JWT_HEADER);

        if !has_api_key && !has_interactive_pair {
            tracing::debug!(
                "Credential resolution failed: api_key={}, public_key={}, secret={}",
                has_api_key,
                has_public_key,
                self.interactive_secret.is_some()
            );
            return Err(if has_public_key {
                AuthError::UnsignedInteractiveSession
            } else {
                AuthError::MissingCredentials
            });
        }

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(
            "Resolved headers: api_key={}, interactive={}",
            has_api_key,
            has_interactive_pair
        );

        Ok(headers)
    }

    /// Attach freshly resolved headers to a request
    pub fn authorize(&self, credentials: &Credentials, mut request: ApiRequest) -> Result<ApiRequest, AuthError> {
        let headers = self.resolve_headers(credentials)?;
        request.headers.extend(headers);
        Ok(request)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, AuthError> {
    let mut value = HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeaderValue(name))?;
    value.set_sensitive(name != PUBLIC_KEY_HEADER);
    Ok(value)
}
