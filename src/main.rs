use anyhow::Context;
use clap::{Parser, Subcommand};
use sports_news_aggregator::{Config, ExtractionStatus, NewsAggregator};
use tracing::info;

#[derive(Parser)]
#[command(name = "sports-news-aggregator")]
#[command(about = "Aggregates Persian sports news feeds for one topic")]
struct Cli {
    /// Print results as JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and list the current filtered entries
    News,
    /// Fetch the full text of entry N from the current batch
    Article { index: usize },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = Config::from_env().context("loading configuration")?;
    let aggregator = NewsAggregator::new(config).context("building aggregator")?;

    match cli.command {
        Command::News => {
            let batch = aggregator.get_news().await?;
            info!(entries = batch.entries.len(), "batch ready");

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            } else if batch.entries.is_empty() {
                println!("No matching news right now.");
            } else {
                for entry in &batch.entries {
                    let source = aggregator
                        .registry()
                        .display_name(&entry.source_id)
                        .unwrap_or(entry.source_id.as_str());
                    let published = entry
                        .published_at
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "unknown time".to_string());
                    println!("[{}] {} ({}, {})", entry.id, entry.title, source, published);
                }
            }
        }
        Command::Article { index } => {
            let batch = aggregator.get_news().await?;
            let article = aggregator.get_article(&batch, index).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&article)?);
            } else {
                match article.status {
                    ExtractionStatus::Unavailable => {
                        println!("The full text of this article could not be retrieved.")
                    }
                    _ => println!("{}", article.text),
                }
            }
        }
    }

    Ok(())
}
