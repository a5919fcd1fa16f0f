use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::{output_record, platform};
use crate::cli::OutputFormat;
use crate::controllers::EcosystemOptions;
use crate::factories::EcosystemFactory;

#[derive(Subcommand)]
pub enum EcosystemCommands {
    #[command(about = "Show the ecosystem data object")]
    Get,
}

pub async fn handle(cmd: EcosystemCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let factory = EcosystemFactory::new(&platform()?);

    match cmd {
        EcosystemCommands::Get => {
            let ecosystem = factory.get(EcosystemOptions::default()).await?;
            output_record(
                &output_format,
                "Ecosystem data object",
                Value::Object(ecosystem.data_object().clone()),
            )
        }
    }
}
