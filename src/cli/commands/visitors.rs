use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_empty_collection, output_success, platform};
use crate::cli::OutputFormat;
use crate::controllers::{MoveAllVisitorsOptions, WorldActivityOptions};
use crate::factories::WorldActivityFactory;

#[derive(Subcommand)]
pub enum VisitorCommands {
    #[command(about = "List visitors in a world")]
    List {
        #[arg(help = "World URL slug")]
        slug: String,
        #[arg(long, help = "Only visitors inside this dropped asset's zone")]
        zone: Option<String>,
    },

    #[command(about = "Move every visitor in a world toward one point")]
    MoveAll {
        #[arg(help = "World URL slug")]
        slug: String,
        #[arg(long, allow_negative_numbers = true, help = "Target x coordinate")]
        x: f64,
        #[arg(long, allow_negative_numbers = true, help = "Target y coordinate")]
        y: f64,
        #[arg(long, default_value_t = 0.0, help = "Scatter radius around the target")]
        scatter: f64,
        #[arg(long, help = "Teleport instead of walking")]
        teleport: bool,
    },
}

pub async fn handle(cmd: VisitorCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let factory = WorldActivityFactory::new(&platform()?);

    match cmd {
        VisitorCommands::List { slug, zone } => {
            let mut activity = factory.create(slug.as_str(), WorldActivityOptions::default());
            let visitors = match zone.as_deref() {
                Some(zone) => activity.fetch_visitors_in_zone(zone, false).await?,
                None => activity.fetch_visitors().await?,
            };

            if visitors.is_empty() {
                return output_empty_collection(&output_format, "visitors", &format!("No visitors in '{}'", slug));
            }

            match output_format {
                OutputFormat::Json => {
                    let rows: Vec<Value> = visitors
                        .values()
                        .map(|visitor| {
                            json!({
                                "id": visitor.id(),
                                "username": visitor.details().username,
                                "position": visitor.position(),
                                "isAdmin": visitor.details().is_admin,
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "visitors": rows }))?);
                }
                OutputFormat::Text => {
                    for visitor in visitors.values() {
                        let position = visitor.position();
                        println!(
                            "{:<10} {:<24} ({}, {})",
                            visitor.id(),
                            visitor.details().username,
                            position.x,
                            position.y
                        );
                    }
                }
            }
            Ok(())
        }
        VisitorCommands::MoveAll {
            slug,
            x,
            y,
            scatter,
            teleport,
        } => {
            let mut activity = factory.create(slug.as_str(), WorldActivityOptions::default());
            let outcomes = activity
                .move_all_visitors(MoveAllVisitorsOptions {
                    x,
                    y,
                    scatter_visitors_by: scatter,
                    should_teleport: teleport,
                    ..MoveAllVisitorsOptions::default()
                })
                .await?;

            let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
            let results: Vec<Value> = outcomes
                .iter()
                .map(|outcome| match &outcome.result {
                    Ok(position) => json!({ "visitorId": outcome.visitor_id, "position": position }),
                    Err(e) => json!({ "visitorId": outcome.visitor_id, "error": e.to_json() }),
                })
                .collect();

            if let OutputFormat::Text = output_format {
                for outcome in &outcomes {
                    match &outcome.result {
                        Ok(position) => println!("  {} -> ({}, {})", outcome.visitor_id, position.x, position.y),
                        Err(e) => println!("  {} failed: {}", outcome.visitor_id, e.message()),
                    }
                }
            }

            output_success(
                &output_format,
                &format!("Moved {} of {} visitors in '{}'", outcomes.len() - failed, outcomes.len(), slug),
                Some(json!({ "outcomes": results })),
            )
        }
    }
}
