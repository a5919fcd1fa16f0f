use clap::Subcommand;

use crate::cli::utils::{output_record, platform};
use crate::cli::OutputFormat;
use crate::controllers::DroppedAssetOptions;
use crate::factories::DroppedAssetFactory;

#[derive(Subcommand)]
pub enum AssetCommands {
    #[command(about = "Show a dropped asset")]
    Show {
        #[arg(help = "World URL slug")]
        slug: String,
        #[arg(help = "Dropped asset id")]
        id: String,
    },
}

pub async fn handle(cmd: AssetCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let factory = DroppedAssetFactory::new(&platform()?);

    match cmd {
        AssetCommands::Show { slug, id } => {
            let asset = factory.get(id.as_str(), slug, DroppedAssetOptions::default()).await?;
            output_record(
                &output_format,
                &format!("Dropped asset '{}'", id),
                serde_json::to_value(asset.details())?,
            )
        }
    }
}
