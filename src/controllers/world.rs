use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use super::dropped_asset::{parse_dropped_asset_list, DroppedAsset, DroppedAssetPayload};
use super::{apply_field, parse_payload, require_non_empty, SdkController};
use crate::auth::Credentials;
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;
use crate::types::Position;

/// Last known world details
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldDetails {
    pub name: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub spawn_position: Option<Position>,
    pub background: Option<String>,
    pub hero_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WorldOptions {
    pub credentials: Option<Credentials>,
    pub attributes: WorldDetails,
    /// Re-fetch after `update_details` instead of applying the sent fields
    pub refresh_after_write: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorldDetailsPayload {
    name: Option<String>,
    description: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    spawn_position: Option<Position>,
    background: Option<String>,
    hero_image: Option<String>,
}

/// Body of `PUT world-details`; only the set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDetailsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

/// Options for dropping a new asset instance into the world
#[derive(Debug, Clone, Default)]
pub struct DropAssetOptions {
    pub asset_id: String,
    pub position: Position,
    pub unique_name: Option<String>,
}

/// A world and the assets dropped into it
#[derive(Debug, Clone)]
pub struct World {
    controller: SdkController,
    credentials: Option<Credentials>,
    url_slug: String,
    details: WorldDetails,
    dropped_assets: BTreeMap<String, DroppedAsset>,
    refresh_after_write: bool,
}

impl World {
    pub fn new(platform: &Platform, url_slug: impl Into<String>, options: WorldOptions) -> Self {
        Self {
            controller: SdkController::new(platform, options.credentials.clone()),
            credentials: options.credentials,
            url_slug: url_slug.into(),
            details: options.attributes,
            dropped_assets: BTreeMap::new(),
            refresh_after_write: options.refresh_after_write,
        }
    }

    pub fn url_slug(&self) -> &str {
        &self.url_slug
    }

    pub fn details(&self) -> &WorldDetails {
        &self.details
    }

    /// Dropped assets as of the last `fetch_dropped_assets`
    pub fn dropped_assets(&self) -> &BTreeMap<String, DroppedAsset> {
        &self.dropped_assets
    }

    fn details_path(&self) -> String {
        format!("world/{}/world-details", self.url_slug)
    }

    fn assets_path(&self) -> String {
        format!("world/{}/assets", self.url_slug)
    }

    pub async fn fetch_details(&mut self) -> Result<(), SdkError> {
        const METHOD: &str = "fetch_details";
        let params = json!({ "urlSlug": self.url_slug });

        let body = self
            .controller
            .get(METHOD, ApiRequest::get(self.details_path()), params.clone())
            .await?;
        let payload: WorldDetailsPayload = parse_payload(METHOD, body, &params)?;
        self.apply_details(payload);
        Ok(())
    }

    pub async fn update_details(&mut self, update: WorldDetailsUpdate) -> Result<(), SdkError> {
        const METHOD: &str = "update_details";
        let body = json!(update);
        let params = json!({ "urlSlug": self.url_slug, "update": body });

        if body.as_object().map_or(true, |fields| fields.is_empty()) {
            return Err(SdkError::validation(METHOD, "at least one field must be updated", params));
        }
        if update.name.is_some() {
            require_non_empty(METHOD, "name", update.name.as_deref(), &params)?;
        }
        if update.width == Some(0) || update.height == Some(0) {
            return Err(SdkError::validation(METHOD, "width and height must be positive", params));
        }

        self.controller.put(METHOD, self.details_path(), body, params).await?;

        if self.refresh_after_write {
            return self.fetch_details().await;
        }

        let details = &mut self.details;
        apply_field(&mut details.name, update.name);
        apply_field(&mut details.description, update.description);
        apply_field(&mut details.width, update.width);
        apply_field(&mut details.height, update.height);
        if update.spawn_position.is_some() {
            details.spawn_position = update.spawn_position;
        }
        if update.hero_image.is_some() {
            details.hero_image = update.hero_image;
        }
        Ok(())
    }

    /// Replace the cached dropped-asset map with the world's current assets
    pub async fn fetch_dropped_assets(&mut self) -> Result<&BTreeMap<String, DroppedAsset>, SdkError> {
        const METHOD: &str = "fetch_dropped_assets";
        let params = json!({ "urlSlug": self.url_slug });

        let body = self
            .controller
            .get(METHOD, ApiRequest::get(self.assets_path()), params.clone())
            .await?;
        let entries = parse_dropped_asset_list(METHOD, body, &params)?;

        let platform = self.controller.platform().clone();
        self.dropped_assets = entries
            .into_iter()
            .map(|(id, payload)| {
                let asset = DroppedAsset::from_payload(&platform, id.clone(), &self.url_slug, self.credentials.clone(), payload);
                (id, asset)
            })
            .collect();

        Ok(&self.dropped_assets)
    }

    /// Drop a new asset instance and return a controller for it
    pub async fn drop_asset(&mut self, options: DropAssetOptions) -> Result<DroppedAsset, SdkError> {
        const METHOD: &str = "drop_asset";
        let mut body = json!({
            "assetId": options.asset_id,
            "position": options.position,
        });
        if let Some(unique_name) = &options.unique_name {
            body["uniqueName"] = json!(unique_name);
        }
        let params = json!({ "urlSlug": self.url_slug, "asset": body });

        require_non_empty(METHOD, "assetId", Some(options.asset_id.as_str()), &params)?;

        let response = self
            .controller
            .post(METHOD, self.assets_path(), body, params.clone())
            .await?;
        let payload: DroppedAssetPayload = parse_payload(METHOD, response, &params)?;

        let id = payload.id.clone().ok_or_else(|| SdkError::Remote {
            sdk_method: METHOD,
            message: "Dropped asset response is missing an id".to_string(),
            status: None,
            params: params.clone(),
        })?;

        let platform = self.controller.platform().clone();
        let mut asset = DroppedAsset::from_payload(&platform, id.clone(), &self.url_slug, self.credentials.clone(), payload);
        // the sent placement stands unless the response said otherwise
        if asset.details().asset_id.is_empty() {
            asset.apply_payload(DroppedAssetPayload {
                asset_id: Some(options.asset_id),
                position: Some(options.position),
                unique_name: options.unique_name,
                ..DroppedAssetPayload::default()
            });
        }

        self.dropped_assets.insert(id, asset.clone());
        Ok(asset)
    }

    fn apply_details(&mut self, payload: WorldDetailsPayload) {
        let details = &mut self.details;
        apply_field(&mut details.name, payload.name);
        apply_field(&mut details.description, payload.description);
        apply_field(&mut details.width, payload.width);
        apply_field(&mut details.height, payload.height);
        for (target, source) in [
            (&mut details.background, payload.background),
            (&mut details.hero_image, payload.hero_image),
        ] {
            if source.is_some() {
                *target = source;
            }
        }
        if payload.spawn_position.is_some() {
            details.spawn_position = payload.spawn_position;
        }
    }
}
