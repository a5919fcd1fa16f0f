use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{apply_field, parse_payload, require_non_empty, SdkController};
use crate::auth::Credentials;
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;
use crate::types::{ClickType, MediaType, Position};

/// Last known server state of an asset placed in a world
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DroppedAssetDetails {
    pub asset_id: String,
    pub unique_name: Option<String>,
    pub position: Position,

    // click facet
    pub click_type: ClickType,
    pub click_link: Option<String>,
    pub click_link_title: Option<String>,
    pub portal_name: Option<String>,
    pub teleport_position: Option<Position>,

    // media facet
    pub media_type: MediaType,
    pub media_link: Option<String>,
    pub audio_volume: Option<u8>,
    pub is_video: bool,

    // broadcast facet
    pub asset_broadcast: bool,
    pub asset_broadcast_all: bool,
    pub broadcaster_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DroppedAssetOptions {
    pub credentials: Option<Credentials>,
    pub attributes: DroppedAssetDetails,
    /// Re-fetch after each facet update instead of applying the sent fields
    pub refresh_after_write: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DroppedAssetPayload {
    pub id: Option<String>,
    pub asset_id: Option<String>,
    pub unique_name: Option<String>,
    pub position: Option<Position>,
    pub click_type: Option<ClickType>,
    pub click_link: Option<String>,
    pub click_link_title: Option<String>,
    pub portal_name: Option<String>,
    pub teleport_position: Option<Position>,
    pub media_type: Option<MediaType>,
    pub media_link: Option<String>,
    pub audio_volume: Option<u8>,
    pub is_video: Option<bool>,
    pub asset_broadcast: Option<bool>,
    pub asset_broadcast_all: Option<bool>,
    pub broadcaster_email: Option<String>,
}

/// Body of `change-click-type`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickTypeUpdate {
    pub click_type: ClickType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_link_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teleport_position: Option<Position>,
}

/// Body of `change-media-type`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpdate {
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_volume: Option<u8>,
    pub is_video: bool,
}

/// Body of `set-asset-broadcast`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastUpdate {
    pub asset_broadcast: bool,
    pub asset_broadcast_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcaster_email: Option<String>,
}

/// An asset instance dropped into a world
#[derive(Debug, Clone)]
pub struct DroppedAsset {
    controller: SdkController,
    id: String,
    url_slug: String,
    details: DroppedAssetDetails,
    refresh_after_write: bool,
}

impl DroppedAsset {
    pub fn new(platform: &Platform, id: impl Into<String>, url_slug: impl Into<String>, options: DroppedAssetOptions) -> Self {
        Self {
            controller: SdkController::new(platform, options.credentials),
            id: id.into(),
            url_slug: url_slug.into(),
            details: options.attributes,
            refresh_after_write: options.refresh_after_write,
        }
    }

    pub(crate) fn from_payload(
        platform: &Platform,
        id: String,
        url_slug: &str,
        credentials: Option<Credentials>,
        payload: DroppedAssetPayload,
    ) -> Self {
        let mut asset = Self::new(
            platform,
            id,
            url_slug,
            DroppedAssetOptions {
                credentials,
                ..DroppedAssetOptions::default()
            },
        );
        asset.apply_payload(payload);
        asset
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url_slug(&self) -> &str {
        &self.url_slug
    }

    pub fn details(&self) -> &DroppedAssetDetails {
        &self.details
    }

    fn path(&self) -> String {
        format!("world/{}/assets/{}", self.url_slug, self.id)
    }

    fn base_params(&self) -> Value {
        json!({ "urlSlug": self.url_slug, "droppedAssetId": self.id })
    }

    /// Refresh every field from the server
    pub async fn fetch_by_id(&mut self) -> Result<(), SdkError> {
        const METHOD: &str = "fetch_dropped_asset_by_id";
        let params = self.base_params();

        let body = self.controller.get(METHOD, ApiRequest::get(self.path()), params.clone()).await?;
        let payload: DroppedAssetPayload = parse_payload(METHOD, body, &params)?;
        self.apply_payload(payload);
        Ok(())
    }

    pub async fn update_position(&mut self, position: Position) -> Result<(), SdkError> {
        const METHOD: &str = "update_position";
        let mut params = self.base_params();
        params["position"] = json!(position);

        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(SdkError::validation(METHOD, "position coordinates must be finite", params));
        }

        let body = json!({ "position": position });
        self.controller
            .put(METHOD, format!("{}/set-position", self.path()), body, params)
            .await?;

        self.settle_write(|details| details.position = position).await
    }

    pub async fn update_click_type(&mut self, update: ClickTypeUpdate) -> Result<(), SdkError> {
        const METHOD: &str = "update_click_type";
        let body = json!(update);
        let mut params = self.base_params();
        params["update"] = body.clone();

        match update.click_type {
            ClickType::Link => require_non_empty(METHOD, "clickLink", update.click_link.as_deref(), &params)?,
            ClickType::Portal => require_non_empty(METHOD, "portalName", update.portal_name.as_deref(), &params)?,
            ClickType::Teleport if update.teleport_position.is_none() => {
                return Err(SdkError::validation(METHOD, "teleportPosition is required", params));
            }
            _ => {}
        }

        self.controller
            .put(METHOD, format!("{}/change-click-type", self.path()), body, params)
            .await?;

        self.settle_write(move |details| {
            details.click_type = update.click_type;
            details.click_link = update.click_link;
            details.click_link_title = update.click_link_title;
            details.portal_name = update.portal_name;
            details.teleport_position = update.teleport_position;
        })
        .await
    }

    pub async fn update_media_type(&mut self, update: MediaUpdate) -> Result<(), SdkError> {
        const METHOD: &str = "update_media_type";
        let body = json!(update);
        let mut params = self.base_params();
        params["update"] = body.clone();

        if update.media_type == MediaType::Link {
            require_non_empty(METHOD, "mediaLink", update.media_link.as_deref(), &params)?;
        }
        if update.audio_volume.is_some_and(|volume| volume > 100) {
            return Err(SdkError::validation(METHOD, "audioVolume must be between 0 and 100", params));
        }

        self.controller
            .put(METHOD, format!("{}/change-media-type", self.path()), body, params)
            .await?;

        self.settle_write(move |details| {
            details.media_type = update.media_type;
            details.media_link = update.media_link;
            details.audio_volume = update.audio_volume;
            details.is_video = update.is_video;
        })
        .await
    }

    pub async fn update_broadcast(&mut self, update: BroadcastUpdate) -> Result<(), SdkError> {
        const METHOD: &str = "update_broadcast";
        let body = json!(update);
        let mut params = self.base_params();
        params["update"] = body.clone();

        if let Some(email) = update.broadcaster_email.as_deref() {
            if !email.contains('@') {
                return Err(SdkError::validation(METHOD, "broadcasterEmail must be an email address", params));
            }
        }

        self.controller
            .put(METHOD, format!("{}/set-asset-broadcast", self.path()), body, params)
            .await?;

        self.settle_write(move |details| {
            details.asset_broadcast = update.asset_broadcast;
            details.asset_broadcast_all = update.asset_broadcast_all;
            details.broadcaster_email = update.broadcaster_email;
        })
        .await
    }

    /// Apply a successful write: the sent fields by default, a fresh fetch when the
    /// asset was built with `refresh_after_write`
    async fn settle_write(&mut self, apply: impl FnOnce(&mut DroppedAssetDetails)) -> Result<(), SdkError> {
        if self.refresh_after_write {
            self.fetch_by_id().await
        } else {
            apply(&mut self.details);
            Ok(())
        }
    }

    pub(crate) fn apply_payload(&mut self, payload: DroppedAssetPayload) {
        let details = &mut self.details;
        apply_field(&mut details.asset_id, payload.asset_id);
        apply_field(&mut details.position, payload.position);
        apply_field(&mut details.click_type, payload.click_type);
        apply_field(&mut details.media_type, payload.media_type);
        apply_field(&mut details.is_video, payload.is_video);
        apply_field(&mut details.asset_broadcast, payload.asset_broadcast);
        apply_field(&mut details.asset_broadcast_all, payload.asset_broadcast_all);

        for (target, source) in [
            (&mut details.unique_name, payload.unique_name),
            (&mut details.click_link, payload.click_link),
            (&mut details.click_link_title, payload.click_link_title),
            (&mut details.portal_name, payload.portal_name),
            (&mut details.media_link, payload.media_link),
            (&mut details.broadcaster_email, payload.broadcaster_email),
        ] {
            if source.is_some() {
                *target = source;
            }
        }
        if payload.teleport_position.is_some() {
            details.teleport_position = payload.teleport_position;
        }
        if payload.audio_volume.is_some() {
            details.audio_volume = payload.audio_volume;
        }
    }
}

/// Parse an asset listing: an array of assets carrying `id`, or an object keyed by id
pub(crate) fn parse_dropped_asset_list(
    sdk_method: &'static str,
    body: Value,
    params: &Value,
) -> Result<Vec<(String, DroppedAssetPayload)>, SdkError> {
    let mut assets = Vec::new();

    match body {
        Value::Array(items) => {
            for value in items {
                let payload: DroppedAssetPayload = match parse_payload(sdk_method, value, params) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("{}: skipping undecodable asset entry: {}", sdk_method, e.message());
                        continue;
                    }
                };
                match payload.id.clone() {
                    Some(id) => assets.push((id, payload)),
                    None => tracing::warn!("{}: skipping asset entry without id", sdk_method),
                }
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                let payload: DroppedAssetPayload = match parse_payload(sdk_method, value, params) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("{}: skipping undecodable asset entry '{}': {}", sdk_method, key, e.message());
                        continue;
                    }
                };
                assets.push((payload.id.clone().unwrap_or(key), payload));
            }
        }
        Value::Null => {}
        other => {
            return Err(SdkError::Remote {
                sdk_method,
                message: format!("Unexpected asset list shape: {}", other),
                status: None,
                params: params.clone(),
            })
        }
    }

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::recording_platform;
    use reqwest::Method;

    const PATH: &str = "world/lobby/assets/da-1";

    fn asset(platform: &Platform, refresh_after_write: bool) -> DroppedAsset {
        DroppedAsset::new(
            platform,
            "da-1",
            "lobby",
            DroppedAssetOptions {
                refresh_after_write,
                ..DroppedAssetOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn link_click_type_requires_link() {
        let (platform, transport) = recording_platform();
        let mut asset = asset(&platform, false);

        let err = asset
            .update_click_type(ClickTypeUpdate {
                click_type: ClickType::Link,
                click_link: Some("".to_string()),
                ..ClickTypeUpdate::default()
            })
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.sdk_method(), Some("update_click_type"));
        assert_eq!(err.params()["update"]["clickType"], "link");
        assert_eq!(transport.call_count(), 0);
        assert_eq!(asset.details().click_type, ClickType::None);
    }

    #[tokio::test]
    async fn click_type_update_is_applied_optimistically() {
        let (platform, transport) = recording_platform();
        let mut asset = asset(&platform, false);

        asset
            .update_click_type(ClickTypeUpdate {
                click_type: ClickType::Link,
                click_link: Some("https://example.com".to_string()),
                click_link_title: Some("Docs".to_string()),
                ..ClickTypeUpdate::default()
            })
            .await
            .unwrap();

        assert_eq!(asset.details().click_type, ClickType::Link);
        assert_eq!(asset.details().click_link.as_deref(), Some("https://example.com"));

        let calls = transport.calls_to(Method::PUT, &format!("{}/change-click-type", PATH));
        assert_eq!(
            calls[0].body.clone().unwrap(),
            json!({ "clickType": "link", "clickLink": "https://example.com", "clickLinkTitle": "Docs" })
        );
        // no re-fetch by default
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_update_leaves_state_unchanged() {
        let (platform, transport) = recording_platform();
        transport.respond(Method::PUT, &format!("{}/set-position", PATH), 403, json!({ "errors": [{ "message": "not yours" }] }));
        let mut asset = asset(&platform, false);

        let err = asset.update_position(Position::new(10.0, 10.0)).await.unwrap_err();
        assert_eq!(err.message(), "not yours");
        assert_eq!(err.params()["position"], json!({ "x": 10.0, "y": 10.0 }));
        assert_eq!(asset.details().position, Position::default());
    }

    #[tokio::test]
    async fn refresh_after_write_takes_server_state() {
        let (platform, transport) = recording_platform();
        transport.respond(Method::GET, PATH, 200, json!({ "position": { "x": 11.0, "y": 12.0 }, "assetId": "tree" }));
        let mut asset = asset(&platform, true);

        asset.update_position(Position::new(10.0, 10.0)).await.unwrap();

        assert_eq!(asset.details().position, Position::new(11.0, 12.0));
        assert_eq!(asset.details().asset_id, "tree");
        assert_eq!(transport.calls_to(Method::GET, PATH).len(), 1);
    }

    #[tokio::test]
    async fn media_link_requires_link_and_sane_volume() {
        let (platform, transport) = recording_platform();
        let mut asset = asset(&platform, false);

        let missing_link = asset
            .update_media_type(MediaUpdate {
                media_type: MediaType::Link,
                ..MediaUpdate::default()
            })
            .await
            .unwrap_err();
        assert!(missing_link.is_validation());

        let loud = asset
            .update_media_type(MediaUpdate {
                media_type: MediaType::None,
                audio_volume: Some(150),
                ..MediaUpdate::default()
            })
            .await
            .unwrap_err();
        assert!(loud.is_validation());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_update_applies_fields() {
        let (platform, _transport) = recording_platform();
        let mut asset = asset(&platform, false);

        asset
            .update_broadcast(BroadcastUpdate {
                asset_broadcast: true,
                asset_broadcast_all: false,
                broadcaster_email: Some("host@example.com".to_string()),
            })
            .await
            .unwrap();

        assert!(asset.details().asset_broadcast);
        assert_eq!(asset.details().broadcaster_email.as_deref(), Some("host@example.com"));
    }

    #[tokio::test]
    async fn fetch_only_overwrites_fields_present_in_payload() {
        let (platform, transport) = recording_platform();
        transport.respond(Method::GET, PATH, 200, json!({ "clickType": "portal", "portalName": "hall" }));
        let mut asset = DroppedAsset::new(
            &platform,
            "da-1",
            "lobby",
            DroppedAssetOptions {
                attributes: DroppedAssetDetails {
                    asset_id: "tree".to_string(),
                    position: Position::new(4.0, 4.0),
                    ..DroppedAssetDetails::default()
                },
                ..DroppedAssetOptions::default()
            },
        );

        asset.fetch_by_id().await.unwrap();

        assert_eq!(asset.details().click_type, ClickType::Portal);
        assert_eq!(asset.details().portal_name.as_deref(), Some("hall"));
        assert_eq!(asset.details().asset_id, "tree");
        assert_eq!(asset.details().position, Position::new(4.0, 4.0));
    }

    #[test]
    fn asset_listing_skips_undecodable_entries() {
        let listing = json!([
            { "id": "a1", "assetId": "tree" },
            { "id": "a2", "clickType": "not-a-click-type" },
            { "id": "a3", "audioVolume": 60 }
        ]);
        let parsed = parse_dropped_asset_list("fetch_dropped_assets", listing, &Value::Null).unwrap();

        let ids: Vec<&str> = parsed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }
}
