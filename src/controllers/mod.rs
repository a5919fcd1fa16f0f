pub mod dropped_asset;
pub mod ecosystem;
pub mod inventory;
pub mod visitor;
pub mod world;
pub mod world_activity;

pub use dropped_asset::{DroppedAsset, DroppedAssetDetails, DroppedAssetOptions};
pub use ecosystem::{Ecosystem, EcosystemOptions};
pub use inventory::{InventoryItem, InventoryItemDetails, InventoryItemOptions};
pub use visitor::{Visitor, VisitorDetails, VisitorOptions};
pub use world::{World, WorldDetails, WorldOptions};
pub use world_activity::{MoveAllVisitorsOptions, WorldActivity, WorldActivityOptions};

use serde_json::Value;

use crate::auth::Credentials;
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;

/// Base every resource controller composes with: the platform handle plus the
/// controller's own credential overrides.
#[derive(Debug, Clone)]
pub struct SdkController {
    platform: Platform,
    credentials: Credentials,
}

impl SdkController {
    pub fn new(platform: &Platform, credentials: Option<Credentials>) -> Self {
        Self {
            platform: platform.clone(),
            credentials: credentials.unwrap_or_default(),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Replace this controller's overrides, e.g. after the caller rotates a key
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    /// Credentials for the next call: own overrides layered on the platform defaults
    pub fn effective_credentials(&self) -> Credentials {
        self.credentials.overlay(self.platform.credentials())
    }

    pub(crate) async fn get(&self, sdk_method: &'static str, request: ApiRequest, params: Value) -> Result<Value, SdkError> {
        self.dispatch(sdk_method, request, params).await
    }

    pub(crate) async fn put(&self, sdk_method: &'static str, path: String, body: Value, params: Value) -> Result<Value, SdkError> {
        self.dispatch(sdk_method, ApiRequest::put(path).with_body(body), params).await
    }

    pub(crate) async fn post(&self, sdk_method: &'static str, path: String, body: Value, params: Value) -> Result<Value, SdkError> {
        self.dispatch(sdk_method, ApiRequest::post(path).with_body(body), params).await
    }

    /// Authorize, send, and normalize the outcome of one call
    async fn dispatch(&self, sdk_method: &'static str, request: ApiRequest, params: Value) -> Result<Value, SdkError> {
        let authorizer = self.platform.authorizer();
        let request = authorizer
            .authorize(&self.effective_credentials(), request)
            .map_err(|e| SdkError::authorization(sdk_method, e))?;

        let method = request.method.clone();
        let path = request.path.clone();

        let response = match authorizer.transport().send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} {} {} failed: {}", sdk_method, method, path, e);
                return Err(SdkError::from_transport(sdk_method, &e, params));
            }
        };

        if !response.is_success() {
            tracing::warn!("{} {} {} returned {}", sdk_method, method, path, response.status);
            return Err(SdkError::from_response(sdk_method, response.status, &response.body, params));
        }

        Ok(response.body)
    }
}

/// Reject blank required string parameters before dispatch
pub(crate) fn require_non_empty(
    sdk_method: &'static str,
    field: &str,
    value: Option<&str>,
    params: &Value,
) -> Result<(), SdkError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(SdkError::validation(
            sdk_method,
            format!("{} is required", field),
            params.clone(),
        )),
    }
}

/// Deserialize a response payload into an entity's typed field set. An empty body
/// carries no fields.
pub(crate) fn parse_payload<T: serde::de::DeserializeOwned>(
    sdk_method: &'static str,
    body: Value,
    params: &Value,
) -> Result<T, SdkError> {
    let body = match body {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(body).map_err(|e| SdkError::Remote {
        sdk_method,
        message: format!("Unexpected response shape: {}", e),
        status: None,
        params: params.clone(),
    })
}

/// Assign `source` to `target` only when the payload carried the field
pub(crate) fn apply_field<T>(target: &mut T, source: Option<T>) {
    if let Some(value) = source {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{anonymous_platform, recording_platform};
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn missing_credentials_never_reach_transport() {
        let (platform, transport) = anonymous_platform();
        let controller = SdkController::new(&platform, None);

        let err = controller
            .get("fetch_details", ApiRequest::get("world/lobby/world-details"), json!({ "urlSlug": "lobby" }))
            .await
            .unwrap_err();

        assert!(err.is_authorization());
        assert_eq!(err.sdk_method(), Some("fetch_details"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn controller_credentials_override_defaults() {
        let (platform, transport) = recording_platform();
        let controller = SdkController::new(&platform, Some(Credentials::with_api_key("override")));

        controller
            .get("fetch_details", ApiRequest::get("world/lobby/world-details"), Value::Null)
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].headers.get("Authorization").unwrap(), "override");
    }

    #[tokio::test]
    async fn rotated_credentials_apply_to_next_call() {
        let (platform, transport) = recording_platform();
        let mut controller = SdkController::new(&platform, None);

        controller.get("a", ApiRequest::get("x"), Value::Null).await.unwrap();
        controller.set_credentials(Credentials::with_api_key("rotated"));
        controller.get("b", ApiRequest::get("x"), Value::Null).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].headers.get("Authorization").unwrap(), "test-api-key");
        assert_eq!(calls[1].headers.get("Authorization").unwrap(), "rotated");
    }

    #[tokio::test]
    async fn non_success_status_is_normalized() {
        let (platform, transport) = recording_platform();
        transport.respond(
            Method::PUT,
            "world/lobby/world-details",
            422,
            json!({ "errors": [{ "message": "name too long" }] }),
        );
        let controller = SdkController::new(&platform, None);

        let err = controller
            .put("update_details", "world/lobby/world-details".to_string(), json!({}), json!({ "name": "x" }))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(422));
        assert_eq!(err.message(), "name too long");
        assert_eq!(err.params()["name"], "x");
    }

    #[test]
    fn require_non_empty_rejects_blank() {
        let params = json!({ "clickLink": " " });
        let err = require_non_empty("update_click_type", "clickLink", Some(" "), &params).unwrap_err();
        assert!(err.is_validation());
        assert!(require_non_empty("m", "f", Some("ok"), &params).is_ok());
        assert!(require_non_empty("m", "f", None, &params).is_err());
    }
}
