mod common;

use anyhow::Result;
use serde_json::{json, Map};
use vworld_sdk::controllers::ecosystem::LockOptions;
use vworld_sdk::controllers::world::{DropAssetOptions, WorldDetailsUpdate};
use vworld_sdk::controllers::{EcosystemOptions, InventoryItemOptions, WorldOptions};
use vworld_sdk::factories::{EcosystemFactory, InventoryItemFactory, WorldFactory};
use vworld_sdk::Position;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::TestApi;

#[tokio::test]
async fn repeated_fetch_with_unchanged_state_is_idempotent() -> Result<()> {
    let api = TestApi::start().await?;
    Mock::given(method("GET"))
        .and(path("/api/world/lobby/world-details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Lobby",
            "description": "Where everyone lands",
            "width": 2000,
            "height": 1500,
            "spawnPosition": { "x": 100.0, "y": 100.0 }
        })))
        .expect(2)
        .mount(&api.server)
        .await;

    let mut world = WorldFactory::new(&api.platform).get("lobby", WorldOptions::default()).await?;
    let first = world.details().clone();
    world.fetch_details().await?;

    assert_eq!(world.details(), &first);
    assert_eq!(first.width, 2000);
    assert_eq!(first.spawn_position, Some(Position::new(100.0, 100.0)));
    Ok(())
}

#[tokio::test]
async fn update_details_sends_only_set_fields() -> Result<()> {
    let api = TestApi::start().await?;
    Mock::given(method("PUT"))
        .and(path("/api/world/lobby/world-details"))
        .and(body_json(json!({ "name": "Main Hall" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api.server)
        .await;

    let mut world = WorldFactory::new(&api.platform).create("lobby", WorldOptions::default());
    world
        .update_details(WorldDetailsUpdate {
            name: Some("Main Hall".to_string()),
            ..WorldDetailsUpdate::default()
        })
        .await?;

    assert_eq!(world.details().name, "Main Hall");
    Ok(())
}

#[tokio::test]
async fn dropped_assets_are_listed_and_dropped() -> Result<()> {
    let api = TestApi::start().await?;
    Mock::given(method("GET"))
        .and(path("/api/world/lobby/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a1", "assetId": "tree", "position": { "x": 1.0, "y": 1.0 } },
            { "id": "a2", "assetId": "rock" }
        ])))
        .mount(&api.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/world/lobby/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "a3" })))
        .expect(1)
        .mount(&api.server)
        .await;

    let mut world = WorldFactory::new(&api.platform).create("lobby", WorldOptions::default());
    let assets = world.fetch_dropped_assets().await?;
    assert_eq!(assets.keys().cloned().collect::<Vec<_>>(), vec!["a1", "a2"]);
    assert_eq!(assets["a1"].details().asset_id, "tree");

    let dropped = world
        .drop_asset(DropAssetOptions {
            asset_id: "bench".to_string(),
            position: Position::new(8.0, 9.0),
            unique_name: Some("bench-north".to_string()),
        })
        .await?;

    assert_eq!(dropped.id(), "a3");
    assert_eq!(dropped.details().asset_id, "bench");
    assert_eq!(dropped.details().position, Position::new(8.0, 9.0));
    assert_eq!(world.dropped_assets().len(), 3);
    Ok(())
}

#[tokio::test]
async fn ecosystem_increment_posts_path_amount_and_lock() -> Result<()> {
    let api = TestApi::start().await?;
    Mock::given(method("GET"))
        .and(path("/api/ecosystem/data-object"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dataObject": { "visits": 4 } })))
        .mount(&api.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/ecosystem/data-object/increment"))
        .and(body_json(json!({
            "path": "visits",
            "amount": 1.0,
            "lock": { "lockId": "visits-lock", "releaseLock": true }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api.server)
        .await;

    let mut ecosystem = EcosystemFactory::new(&api.platform).get(EcosystemOptions::default()).await?;
    ecosystem
        .increment_data_object_value(
            "visits",
            1.0,
            Some(LockOptions {
                lock_id: "visits-lock".to_string(),
                release_lock: true,
            }),
        )
        .await?;

    assert_eq!(ecosystem.data_object()["visits"], 5.0);
    Ok(())
}

#[tokio::test]
async fn ecosystem_set_replaces_the_cached_object() -> Result<()> {
    let api = TestApi::start().await?;
    Mock::given(method("POST"))
        .and(path("/api/ecosystem/data-object"))
        .and(body_json(json!({ "dataObject": { "season": 2 } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api.server)
        .await;

    let mut ecosystem = EcosystemFactory::new(&api.platform).create(EcosystemOptions::default());
    let mut data = Map::new();
    data.insert("season".to_string(), json!(2));
    ecosystem.set_data_object(data, None).await?;

    assert_eq!(ecosystem.data_object()["season"], 2);
    Ok(())
}

#[tokio::test]
async fn inventory_item_is_fetched_by_id() -> Result<()> {
    let api = TestApi::start().await?;
    Mock::given(method("GET"))
        .and(path("/api/inventory/badge-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Explorer badge",
            "type": "BADGE",
            "status": "ACTIVE"
        })))
        .mount(&api.server)
        .await;

    let item = InventoryItemFactory::new(&api.platform)
        .get("badge-7", InventoryItemOptions::default())
        .await?;

    assert_eq!(item.details().name, "Explorer badge");
    assert_eq!(item.details().item_type, "BADGE");
    Ok(())
}
