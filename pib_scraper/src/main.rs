use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use pib_scraper::{
    ai::OpenAiClient,
    config::Settings,
    pipeline::{Pipeline, RunOutcome, RunPhase, RunRequest, SummaryOutcome},
    telemetry, utils, DateSelection, ListingItem,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch -> filter -> summarize PIB press releases", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest listings for a date or a set of months and optionally filter them by topic
    Run {
        /// Topic to filter by (e.g. "Digital India"); empty keeps everything
        #[arg(short, long, default_value = "")]
        topic: String,

        /// Day of month for a specific-date search
        #[arg(short, long, requires = "month", conflicts_with = "months")]
        day: Option<u32>,

        /// Month for a specific-date search
        #[arg(short, long, requires = "day")]
        month: Option<u32>,

        /// Whole months to search, e.g. 1,2,3
        #[arg(long, value_delimiter = ',')]
        months: Vec<u32>,

        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Where to write the results as JSON
        #[arg(short, long, default_value = "results.json")]
        output: PathBuf,
    },
    /// Summarize one article into a PDF
    Summarize {
        #[arg(long)]
        url: String,

        #[arg(long)]
        title: String,

        /// Sequence number used for the default file name
        #[arg(long, default_value_t = 0)]
        index: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn selection(day: Option<u32>, month: Option<u32>, months: Vec<u32>, year: i32) -> DateSelection {
    match (day, month) {
        (Some(day), Some(month)) => DateSelection::SpecificDate { day, month, year },
        _ if months.is_empty() => DateSelection::Months { months: vec![1], year },
        _ => DateSelection::Months { months, year },
    }
}

fn print_items(items: &[ListingItem]) {
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. [{}] {}\n     {}", i, item.date_label, item.title, item.url);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();
    let cli = Cli::parse();

    let api_key = cli.settings.require_api_key()?;
    let service = Arc::new(OpenAiClient::new(
        cli.settings.api_url.clone(),
        api_key,
        cli.settings.model.clone(),
    )?);
    let pipeline = Pipeline::new(&cli.settings.pipeline_config(), service)?;

    match cli.command {
        Command::Run { topic, day, month, months, year, output } => {
            let year = year.unwrap_or_else(|| chrono::Utc::now().year());
            let selection = selection(day, month, months, year);
            selection.validate().map_err(anyhow::Error::msg)?;

            let request = RunRequest { topic, selection };
            let outcome = pipeline
                .run(&request, |phase| match phase {
                    RunPhase::Harvesting { requests } => info!(requests, "scraping PIB website"),
                    RunPhase::Filtering { completed, total } => info!(completed, total, "filtering"),
                })
                .await;

            match outcome {
                RunOutcome::NoData => eprintln!("No data found."),
                RunOutcome::Complete(result) => {
                    println!("Found {} relevant articles.", result.items.len());
                    print_items(&result.items);
                    utils::save_json(&result, &output)
                        .with_context(|| format!("writing {}", output.display()))?;
                }
            }
        }
        Command::Summarize { url, title, index, output } => {
            let item = ListingItem::new(title, url, "");
            match pipeline.summarize_item(index, &item).await {
                SummaryOutcome::Ready(artifact) => {
                    println!("{}", artifact.summary);
                    let path = output.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
                    utils::save_bytes(&artifact.pdf, &path)
                        .with_context(|| format!("writing {}", path.display()))?;
                }
                SummaryOutcome::CouldNotFetch => anyhow::bail!("Could not fetch article text."),
                SummaryOutcome::RenderFailed(e) => anyhow::bail!("PDF generation failed: {e}"),
            }
        }
    }

    Ok(())
}
