use serde_json::json;
use std::collections::BTreeMap;

use super::visitor::{parse_visitor_list, Visitor};
use super::SdkController;
use crate::auth::Credentials;
use crate::batch::{self, BatchOutcome, VisitorMove};
use crate::client::ApiRequest;
use crate::error::SdkError;
use crate::platform::Platform;
use crate::types::Position;

#[derive(Debug, Clone, Default)]
pub struct WorldActivityOptions {
    pub credentials: Option<Credentials>,
}

/// Options for moving every known visitor toward one target
#[derive(Debug, Clone)]
pub struct MoveAllVisitorsOptions {
    pub x: f64,
    pub y: f64,
    /// Per-axis jitter radius; 0 moves everyone to the exact target
    pub scatter_visitors_by: f64,
    /// Refresh the visitor set before moving
    pub should_fetch_visitors: bool,
    pub should_teleport: bool,
    /// Limit a refresh to the zone around this dropped asset
    pub dropped_asset_id: Option<String>,
}

impl Default for MoveAllVisitorsOptions {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scatter_visitors_by: 0.0,
            should_fetch_visitors: true,
            should_teleport: false,
            dropped_asset_id: None,
        }
    }
}

/// Live activity in one world: the current visitor set and batch movement over it
#[derive(Debug, Clone)]
pub struct WorldActivity {
    controller: SdkController,
    credentials: Option<Credentials>,
    url_slug: String,
    visitors: BTreeMap<u64, Visitor>,
}

impl WorldActivity {
    pub fn new(platform: &Platform, url_slug: impl Into<String>, options: WorldActivityOptions) -> Self {
        Self {
            controller: SdkController::new(platform, options.credentials.clone()),
            credentials: options.credentials,
            url_slug: url_slug.into(),
            visitors: BTreeMap::new(),
        }
    }

    pub fn url_slug(&self) -> &str {
        &self.url_slug
    }

    /// Visitors as of the last refresh
    pub fn visitors(&self) -> &BTreeMap<u64, Visitor> {
        &self.visitors
    }

    pub fn visitor(&self, visitor_id: u64) -> Option<&Visitor> {
        self.visitors.get(&visitor_id)
    }

    /// Replace the cached visitor set with everyone currently in the world
    pub async fn fetch_visitors(&mut self) -> Result<&BTreeMap<u64, Visitor>, SdkError> {
        const METHOD: &str = "fetch_visitors";
        let params = json!({ "urlSlug": self.url_slug });
        let request = ApiRequest::get(self.visitors_path());

        self.refresh_visitors(METHOD, request, params).await
    }

    /// Replace the cached visitor set with the visitors inside a dropped asset's zone
    pub async fn fetch_visitors_in_zone(
        &mut self,
        dropped_asset_id: &str,
        should_include_admin_permissions: bool,
    ) -> Result<&BTreeMap<u64, Visitor>, SdkError> {
        const METHOD: &str = "fetch_visitors_in_zone";
        let params = json!({
            "urlSlug": self.url_slug,
            "droppedAssetId": dropped_asset_id,
            "shouldIncludeAdminPermissions": should_include_admin_permissions,
        });
        super::require_non_empty(METHOD, "droppedAssetId", Some(dropped_asset_id), &params)?;

        let request = ApiRequest::get(self.visitors_path())
            .with_query("droppedAssetId", dropped_asset_id)
            .with_query("shouldIncludeAdminPermissions", should_include_admin_permissions);

        self.refresh_visitors(METHOD, request, params).await
    }

    async fn refresh_visitors(
        &mut self,
        sdk_method: &'static str,
        request: ApiRequest,
        params: serde_json::Value,
    ) -> Result<&BTreeMap<u64, Visitor>, SdkError> {
        let body = self.controller.get(sdk_method, request, params.clone()).await?;
        let entries = parse_visitor_list(sdk_method, body, &params)?;

        let platform = self.controller.platform().clone();
        self.visitors = entries
            .into_iter()
            .map(|(id, payload)| {
                let visitor = Visitor::from_payload(&platform, id, &self.url_slug, self.credentials.clone(), payload);
                (id, visitor)
            })
            .collect();

        tracing::debug!("{}: {} visitors cached for {}", sdk_method, self.visitors.len(), self.url_slug);

        Ok(&self.visitors)
    }

    /// Move every known visitor toward one target, concurrently.
    ///
    /// Only a failed refresh fails the whole call; individual move failures are
    /// reported in their outcome slot, ordered by visitor id.
    pub async fn move_all_visitors(&mut self, options: MoveAllVisitorsOptions) -> Result<Vec<BatchOutcome>, SdkError> {
        const METHOD: &str = "move_all_visitors";
        let target = Position::new(options.x, options.y);
        batch::validate_target(METHOD, target, options.scatter_visitors_by)?;

        if options.should_fetch_visitors {
            match options.dropped_asset_id.as_deref() {
                Some(zone) => {
                    self.fetch_visitors_in_zone(zone, false).await?;
                }
                None => {
                    self.fetch_visitors().await?;
                }
            }
        }

        if self.visitors.is_empty() {
            return Ok(Vec::new());
        }

        let moves = {
            let mut rng = rand::thread_rng();
            batch::plan_move_all(
                self.visitors.keys().copied(),
                target,
                options.scatter_visitors_by,
                options.should_teleport,
                &mut rng,
            )
        };

        Ok(batch::dispatch_moves(&mut self.visitors, moves).await)
    }

    /// Move cached visitors to explicit destinations, concurrently, without scatter
    pub async fn move_visitors(&mut self, moves: Vec<VisitorMove>) -> Vec<BatchOutcome> {
        batch::dispatch_moves(&mut self.visitors, moves).await
    }

    fn visitors_path(&self) -> String {
        format!("world/{}/visitors", self.url_slug)
    }
}
