pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::SdkError;

#[derive(Parser)]
#[command(name = "vworld")]
#[command(about = "vworld CLI - inspect and drive worlds on the virtual-world platform")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "World details and dropped assets")]
    World {
        #[command(subcommand)]
        cmd: commands::world::WorldCommands,
    },

    #[command(about = "Visitors currently in a world")]
    Visitors {
        #[command(subcommand)]
        cmd: commands::visitors::VisitorCommands,
    },

    #[command(about = "Single dropped asset operations")]
    Asset {
        #[command(subcommand)]
        cmd: commands::asset::AssetCommands,
    },

    #[command(about = "Ecosystem data object")]
    Ecosystem {
        #[command(subcommand)]
        cmd: commands::ecosystem::EcosystemCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::World { cmd } => commands::world::handle(cmd, output_format).await,
        Commands::Visitors { cmd } => commands::visitors::handle(cmd, output_format).await,
        Commands::Asset { cmd } => commands::asset::handle(cmd, output_format).await,
        Commands::Ecosystem { cmd } => commands::ecosystem::handle(cmd, output_format).await,
    }
}

/// Report a failed command once, in the requested format
pub fn report_error(output_format: &OutputFormat, error: &anyhow::Error, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        eprintln!("Error: {error:?}");
        return Ok(());
    }

    match error.downcast_ref::<SdkError>() {
        Some(sdk_error) => utils::output_error(output_format, &sdk_error.message(), Some(sdk_error.error_code())),
        None => utils::output_error(output_format, &error.to_string(), None),
    }
}
