// Factories bind a platform handle once and hand out controllers sharing it.
// `create` never touches the network; `get` creates and performs one fetch.

use crate::controllers::{
    DroppedAsset, DroppedAssetOptions, Ecosystem, EcosystemOptions, InventoryItem, InventoryItemOptions, Visitor,
    VisitorOptions, World, WorldActivity, WorldActivityOptions, WorldOptions,
};
use crate::error::SdkError;
use crate::platform::Platform;

#[derive(Debug, Clone)]
pub struct WorldFactory {
    platform: Platform,
}

impl WorldFactory {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
        }
    }

    pub fn create(&self, url_slug: impl Into<String>, options: WorldOptions) -> World {
        World::new(&self.platform, url_slug, options)
    }

    pub async fn get(&self, url_slug: impl Into<String>, options: WorldOptions) -> Result<World, SdkError> {
        let mut world = self.create(url_slug, options);
        world.fetch_details().await?;
        Ok(world)
    }
}

#[derive(Debug, Clone)]
pub struct WorldActivityFactory {
    platform: Platform,
}

impl WorldActivityFactory {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
        }
    }

    pub fn create(&self, url_slug: impl Into<String>, options: WorldActivityOptions) -> WorldActivity {
        WorldActivity::new(&self.platform, url_slug, options)
    }

    /// Activity handle with its visitor set already loaded
    pub async fn get(&self, url_slug: impl Into<String>, options: WorldActivityOptions) -> Result<WorldActivity, SdkError> {
        let mut activity = self.create(url_slug, options);
        activity.fetch_visitors().await?;
        Ok(activity)
    }
}

#[derive(Debug, Clone)]
pub struct VisitorFactory {
    platform: Platform,
}

impl VisitorFactory {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
        }
    }

    pub fn create(&self, id: u64, url_slug: impl Into<String>, options: VisitorOptions) -> Visitor {
        Visitor::new(&self.platform, id, url_slug, options)
    }

    pub async fn get(&self, id: u64, url_slug: impl Into<String>, options: VisitorOptions) -> Result<Visitor, SdkError> {
        let mut visitor = self.create(id, url_slug, options);
        visitor.fetch_visitor().await?;
        Ok(visitor)
    }
}

#[derive(Debug, Clone)]
pub struct DroppedAssetFactory {
    platform: Platform,
}

impl DroppedAssetFactory {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
        }
    }

    pub fn create(&self, id: impl Into<String>, url_slug: impl Into<String>, options: DroppedAssetOptions) -> DroppedAsset {
        DroppedAsset::new(&self.platform, id, url_slug, options)
    }

    pub async fn get(
        &self,
        id: impl Into<String>,
        url_slug: impl Into<String>,
        options: DroppedAssetOptions,
    ) -> Result<DroppedAsset, SdkError> {
        let mut asset = self.create(id, url_slug, options);
        asset.fetch_by_id().await?;
        Ok(asset)
    }
}

#[derive(Debug, Clone)]
pub struct EcosystemFactory {
    platform: Platform,
}

impl EcosystemFactory {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
        }
    }

    pub fn create(&self, options: EcosystemOptions) -> Ecosystem {
        Ecosystem::new(&self.platform, options)
    }

    pub async fn get(&self, options: EcosystemOptions) -> Result<Ecosystem, SdkError> {
        let mut ecosystem = self.create(options);
        ecosystem.fetch_data_object().await?;
        Ok(ecosystem)
    }
}

#[derive(Debug, Clone)]
pub struct InventoryItemFactory {
    platform: Platform,
}

impl InventoryItemFactory {
    pub fn new(platform: &Platform) -> Self {
        Self {
            platform: platform.clone(),
        }
    }

    pub fn create(&self, id: impl Into<String>, options: InventoryItemOptions) -> InventoryItem {
        InventoryItem::new(&self.platform, id, options)
    }

    pub async fn get(&self, id: impl Into<String>, options: InventoryItemOptions) -> Result<InventoryItem, SdkError> {
        let mut item = self.create(id, options);
        item.fetch_by_id().await?;
        Ok(item)
    }
}
