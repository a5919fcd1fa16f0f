use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{apply_field, parse_payload, SdkController};
use crate::auth::Credentials;
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;
use crate::types::Position;

/// Last known server state of a visitor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisitorDetails {
    pub username: String,
    pub display_name: String,
    pub position: Position,
    pub is_admin: bool,
    pub private_zone_id: Option<String>,
    pub landmark_zones: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VisitorOptions {
    pub credentials: Option<Credentials>,
    pub attributes: VisitorDetails,
}

/// Visitor payload as returned by the visitor endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VisitorPayload {
    pub player_id: Option<u64>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub move_to: Option<Position>,
    pub position: Option<Position>,
    pub is_admin: Option<bool>,
    pub private_zone_id: Option<String>,
    pub landmark_zones: Option<Vec<String>>,
}

/// A visitor inside one world
#[derive(Debug, Clone)]
pub struct Visitor {
    controller: SdkController,
    id: u64,
    url_slug: String,
    details: VisitorDetails,
    last_moved_at: Option<DateTime<Utc>>,
}

impl Visitor {
    pub fn new(platform: &Platform, id: u64, url_slug: impl Into<String>, options: VisitorOptions) -> Self {
        Self {
            controller: SdkController::new(platform, options.credentials),
            id,
            url_slug: url_slug.into(),
            details: options.attributes,
            last_moved_at: None,
        }
    }

    pub(crate) fn from_payload(
        platform: &Platform,
        id: u64,
        url_slug: &str,
        credentials: Option<Credentials>,
        payload: VisitorPayload,
    ) -> Self {
        let mut visitor = Self::new(
            platform,
            id,
            url_slug,
            VisitorOptions {
                credentials,
                attributes: VisitorDetails::default(),
            },
        );
        visitor.apply_payload(payload);
        visitor
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url_slug(&self) -> &str {
        &self.url_slug
    }

    pub fn details(&self) -> &VisitorDetails {
        &self.details
    }

    pub fn position(&self) -> Position {
        self.details.position
    }

    /// When this handle last saw a successful move
    pub fn last_moved_at(&self) -> Option<DateTime<Utc>> {
        self.last_moved_at
    }

    pub fn controller(&self) -> &SdkController {
        &self.controller
    }

    fn path(&self) -> String {
        format!("world/{}/visitors/{}", self.url_slug, self.id)
    }

    /// Refresh every visitor field from the server
    pub async fn fetch_visitor(&mut self) -> Result<(), SdkError> {
        const METHOD: &str = "fetch_visitor";
        let params = json!({ "urlSlug": self.url_slug, "visitorId": self.id });

        let body = self.controller.get(METHOD, ApiRequest::get(self.path()), params.clone()).await?;
        let payload: VisitorPayload = parse_payload(METHOD, body, &params)?;
        self.apply_payload(payload);
        Ok(())
    }

    /// Move (walk or teleport) this visitor to `destination`.
    ///
    /// On success the cached position takes the response's `moveTo` when present, the
    /// sent destination otherwise. On failure the cached position is untouched.
    pub async fn move_visitor(&mut self, destination: Position, teleport: bool) -> Result<Position, SdkError> {
        const METHOD: &str = "move_visitor";
        let params = json!({
            "urlSlug": self.url_slug,
            "visitorId": self.id,
            "moveTo": destination,
            "teleport": teleport,
        });

        if !destination.x.is_finite() || !destination.y.is_finite() {
            return Err(SdkError::validation(METHOD, "moveTo coordinates must be finite", params));
        }

        let body = json!({ "moveTo": destination, "teleport": teleport });
        let response = self
            .controller
            .put(METHOD, format!("{}/move", self.path()), body, params)
            .await?;

        let position = position_from_response(&response).unwrap_or(destination);
        self.details.position = position;
        self.last_moved_at = Some(Utc::now());

        tracing::debug!("Visitor {} in {} moved to ({}, {})", self.id, self.url_slug, position.x, position.y);

        Ok(position)
    }

    pub(crate) fn apply_payload(&mut self, payload: VisitorPayload) {
        apply_field(&mut self.details.username, payload.username);
        apply_field(&mut self.details.display_name, payload.display_name);
        apply_field(&mut self.details.position, payload.move_to.or(payload.position));
        apply_field(&mut self.details.is_admin, payload.is_admin);
        apply_field(&mut self.details.landmark_zones, payload.landmark_zones);
        if payload.private_zone_id.is_some() {
            self.details.private_zone_id = payload.private_zone_id;
        }
    }
}

fn position_from_response(body: &Value) -> Option<Position> {
    body.get("moveTo")
        .or_else(|| body.get("position"))
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

/// Parse a visitor listing: either an object keyed by visitor id or an array of
/// visitor objects carrying `playerId`. Entries without a usable id, or that do not
/// decode, are skipped.
pub(crate) fn parse_visitor_list(
    sdk_method: &'static str,
    body: Value,
    params: &Value,
) -> Result<Vec<(u64, VisitorPayload)>, SdkError> {
    let mut visitors = Vec::new();

    match body {
        Value::Object(map) => {
            for (key, value) in map {
                let payload: VisitorPayload = match parse_payload(sdk_method, value, params) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("{}: skipping undecodable visitor entry '{}': {}", sdk_method, key, e.message());
                        continue;
                    }
                };
                match key.parse::<u64>().ok().or(payload.player_id) {
                    Some(id) => visitors.push((id, payload)),
                    None => tracing::warn!("{}: skipping visitor entry with key '{}'", sdk_method, key),
                }
            }
        }
        Value::Array(items) => {
            for value in items {
                let payload: VisitorPayload = match parse_payload(sdk_method, value, params) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("{}: skipping undecodable visitor entry: {}", sdk_method, e.message());
                        continue;
                    }
                };
                match payload.player_id {
                    Some(id) => visitors.push((id, payload)),
                    None => tracing::warn!("{}: skipping visitor entry without playerId", sdk_method),
                }
            }
        }
        Value::Null => {}
        other => {
            return Err(SdkError::Remote {
                sdk_method,
                message: format!("Unexpected visitor list shape: {}", other),
                status: None,
                params: params.clone(),
            })
        }
    }

    Ok(visitors)
}
