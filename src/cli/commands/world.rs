use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_empty_collection, output_record, platform};
use crate::cli::OutputFormat;
use crate::controllers::{DroppedAsset, WorldOptions};
use crate::factories::WorldFactory;

#[derive(Subcommand)]
pub enum WorldCommands {
    #[command(about = "Show world details")]
    Details {
        #[arg(help = "World URL slug")]
        slug: String,
    },

    #[command(about = "List dropped assets in a world")]
    Assets {
        #[arg(help = "World URL slug")]
        slug: String,
    },
}

pub async fn handle(cmd: WorldCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let factory = WorldFactory::new(&platform()?);

    match cmd {
        WorldCommands::Details { slug } => {
            let world = factory.get(slug.as_str(), WorldOptions::default()).await?;
            output_record(&output_format, &format!("World '{}'", slug), serde_json::to_value(world.details())?)
        }
        WorldCommands::Assets { slug } => {
            let mut world = factory.create(slug.as_str(), WorldOptions::default());
            let assets = world.fetch_dropped_assets().await?;

            if assets.is_empty() {
                return output_empty_collection(&output_format, "assets", &format!("No dropped assets in '{}'", slug));
            }

            let rows: Vec<Value> = assets
                .values()
                .map(|asset| {
                    json!({
                        "id": asset.id(),
                        "assetId": asset.details().asset_id,
                        "uniqueName": asset.details().unique_name,
                        "position": asset.details().position,
                    })
                })
                .collect();

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "assets": rows }))?),
                OutputFormat::Text => {
                    for asset in assets.values() {
                        println!("{}", asset_row(asset));
                    }
                }
            }
            Ok(())
        }
    }
}

/// One `world assets` text line: id, unique name (or `-`), position
fn asset_row(asset: &DroppedAsset) -> String {
    let details = asset.details();
    format!(
        "{:<24} {:<24} ({}, {})",
        asset.id(),
        details.unique_name.as_deref().unwrap_or("-"),
        details.position.x,
        details.position.y
    )
}
