use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{apply_field, parse_payload, require_non_empty, SdkController};
use crate::auth::Credentials;
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryItemDetails {
    pub name: String,
    pub description: String,
    pub item_type: String,
    pub image_url: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryItemOptions {
    pub credentials: Option<Credentials>,
    pub attributes: InventoryItemDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryItemPayload {
    name: Option<String>,
    description: Option<String>,
    #[serde(alias = "type")]
    item_type: Option<String>,
    image_url: Option<String>,
    status: Option<String>,
}

/// An item definition in an application's inventory
#[derive(Debug, Clone)]
pub struct InventoryItem {
    controller: SdkController,
    id: String,
    details: InventoryItemDetails,
}

impl InventoryItem {
    pub fn new(platform: &Platform, id: impl Into<String>, options: InventoryItemOptions) -> Self {
        Self {
            controller: SdkController::new(platform, options.credentials),
            id: id.into(),
            details: options.attributes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn details(&self) -> &InventoryItemDetails {
        &self.details
    }

    pub async fn fetch_by_id(&mut self) -> Result<&InventoryItemDetails, SdkError> {
        const METHOD: &str = "fetch_inventory_item_by_id";
        let params = json!({ "itemId": self.id });
        require_non_empty(METHOD, "itemId", Some(&self.id), &params)?;

        let body = self
            .controller
            .get(METHOD, ApiRequest::get(format!("inventory/{}", self.id)), params.clone())
            .await?;
        let payload: InventoryItemPayload = parse_payload(METHOD, body, &params)?;

        apply_field(&mut self.details.name, payload.name);
        apply_field(&mut self.details.description, payload.description);
        apply_field(&mut self.details.item_type, payload.item_type);
        apply_field(&mut self.details.status, payload.status);
        if payload.image_url.is_some() {
            self.details.image_url = payload.image_url;
        }

        Ok(&self.details)
    }
}
