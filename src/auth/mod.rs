use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The caller's authority for one or more calls.
///
/// Every field is optional: an API key alone authorizes as a platform account, while the
/// interactive fields together identify one embedded-application session. Validation is
/// deferred to call time because controllers may overlay their own credentials on top of
/// the platform defaults.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub api_key: Option<String>,
    pub interactive_public_key: Option<String>,
    pub interactive_nonce: Option<String>,
    pub asset_id: Option<String>,
    pub url_slug: Option<String>,
    pub visitor_id: Option<u64>,
}

impl Credentials {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Produce the effective credentials for a call: fields set on `self` win, the rest
    /// fall back to `defaults`. Neither input is modified.
    pub fn overlay(&self, defaults: &Credentials) -> Credentials {
        Credentials {
            api_key: self.api_key.clone().or_else(|| defaults.api_key.clone()),
            interactive_public_key: self
                .interactive_public_key
                .clone()
                .or_else(|| defaults.interactive_public_key.clone()),
            interactive_nonce: self
                .interactive_nonce
                .clone()
                .or_else(|| defaults.interactive_nonce.clone()),
            asset_id: self.asset_id.clone().or_else(|| defaults.asset_id.clone()),
            url_slug: self.url_slug.clone().or_else(|| defaults.url_slug.clone()),
            visitor_id: self.visitor_id.or(defaults.visitor_id),
        }
    }

    /// Session claims, present only when every signable field is set
    pub fn interactive_claims(&self) -> Option<InteractiveClaims> {
        Some(InteractiveClaims {
            interactive_nonce: self.interactive_nonce.clone()?,
            asset_id: self.asset_id.clone()?,
            url_slug: self.url_slug.clone()?,
            visitor_id: self.visitor_id?,
            interactive_public_key: self.interactive_public_key.clone()?,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("interactive_public_key", &self.interactive_public_key)
            .field("interactive_nonce", &self.interactive_nonce.as_ref().map(|_| "***"))
            .field("asset_id", &self.asset_id)
            .field("url_slug", &self.url_slug)
            .field("visitor_id", &self.visitor_id)
            .finish()
    }
}

/// Exactly the session fields covered by the `interactiveJWT` signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveClaims {
    pub interactive_nonce: String,
    pub asset_id: String,
    pub url_slug: String,
    pub visitor_id: u64,
    pub interactive_public_key: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("no API key or signable interactive session is available for this call")]
    MissingCredentials,

    #[error("interactive public key is set but no signed session token could be produced")]
    UnsignedInteractiveSession,

    #[error("credential value for header '{0}' contains invalid characters")]
    InvalidHeaderValue(&'static str),

    #[error("interactive token signing failed: {0}")]
    TokenSigning(String),

    #[error("interactive secret is empty")]
    InvalidSecret,
}

/// Sign the interactive session claims with the platform's HS256 secret
pub fn sign_interactive_token(claims: &InteractiveClaims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| AuthError::TokenSigning(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn session() -> Credentials {
        Credentials {
            api_key: None,
            interactive_public_key: Some("pk_live".to_string()),
            interactive_nonce: Some("nonce-1".to_string()),
            asset_id: Some("asset-9".to_string()),
            url_slug: Some("lobby".to_string()),
            visitor_id: Some(42),
        }
    }

    #[test]
    fn overlay_prefers_own_fields() {
        let defaults = Credentials {
            api_key: Some("default-key".to_string()),
            url_slug: Some("default-world".to_string()),
            ..Credentials::default()
        };
        let own = Credentials {
            url_slug: Some("lobby".to_string()),
            visitor_id: Some(7),
            ..Credentials::default()
        };

        let effective = own.overlay(&defaults);
        assert_eq!(effective.api_key.as_deref(), Some("default-key"));
        assert_eq!(effective.url_slug.as_deref(), Some("lobby"));
        assert_eq!(effective.visitor_id, Some(7));
        // inputs untouched
        assert_eq!(own.api_key, None);
        assert_eq!(defaults.visitor_id, None);
    }

    #[test]
    fn claims_require_every_session_field() {
        assert!(session().interactive_claims().is_some());

        let mut missing_nonce = session();
        missing_nonce.interactive_nonce = None;
        assert!(missing_nonce.interactive_claims().is_none());

        let mut missing_visitor = session();
        missing_visitor.visitor_id = None;
        assert!(missing_visitor.interactive_claims().is_none());
    }

    #[test]
    fn signed_token_carries_exactly_the_session_fields() {
        let claims = session().interactive_claims().unwrap();
        let token = sign_interactive_token(&claims, "top-secret").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let decoded = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"top-secret"),
            &validation,
        )
        .unwrap();

        let object = decoded.claims.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["assetId", "interactiveNonce", "interactivePublicKey", "urlSlug", "visitorId"]
        );
        assert_eq!(object["visitorId"], 42);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = session().interactive_claims().unwrap();
        assert_eq!(sign_interactive_token(&claims, ""), Err(AuthError::InvalidSecret));
    }

    #[test]
    fn debug_masks_api_key() {
        let rendered = format!("{:?}", Credentials::with_api_key("sk_live_123"));
        assert!(!rendered.contains("sk_live_123"));
    }
}
