mod client;
mod error;
mod extract;
mod output;
mod query;
mod rows;
mod settings;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use client::StudiesClient;
use extract::Unlocated;
use output::WriteOutcome;
use rows::FlatRow;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "ctgov_locations",
    about = "Export ClinicalTrials.gov study sites to CSV, one row per trial location"
)]
struct Cli {
    #[command(flatten)]
    query: QueryArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct QueryArgs {
    /// Studies endpoint
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Condition to search for (query.cond)
    #[arg(long, global = true)]
    condition: Option<String>,
    /// Earliest study start date, YYYY-MM-DD
    #[arg(long, global = true)]
    start_date: Option<NaiveDate>,
    /// Studies per page
    #[arg(long, global = true)]
    page_size: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every page, flatten, and write the CSV (default)
    Run {
        /// Output file (default: locations.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
        /// Emit one row with empty location columns for studies without sites
        #[arg(long)]
        include_unlocated: bool,
    },
    /// Fetch the first page only and print its rows
    Preview {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut overrides = Overrides {
        base_url: cli.query.base_url,
        condition: cli.query.condition,
        start_date: cli.query.start_date,
        page_size: cli.query.page_size,
        ..Default::default()
    };
    let command = cli.command.unwrap_or(Commands::Run {
        output: None,
        max_pages: None,
        include_unlocated: false,
    });
    if let Commands::Run {
        output,
        max_pages,
        include_unlocated,
    } = &command
    {
        overrides.output = output.clone();
        overrides.max_pages = *max_pages;
        overrides.include_unlocated = *include_unlocated;
    }

    let settings = Settings::load()
        .context("Invalid CTGOV_* configuration")?
        .override_with(overrides);
    tracing::debug!(settings = ?settings, "Loaded settings");

    let client = StudiesClient::new(settings.base_url.clone());

    let result = match command {
        Commands::Run { .. } => {
            let rows = collect_rows(&client, &settings, &mut std::io::stdout()).await?;
            println!("Flattened {} rows", rows.len());
            match output::save_csv(&rows, &settings.output)
                .with_context(|| format!("Failed to write {}", settings.output.display()))?
            {
                WriteOutcome::Written { .. } => {
                    println!("Data saved to {}", settings.output.display())
                }
                WriteOutcome::NoData => println!("No data to save."),
            }
            Ok(())
        }
        Commands::Preview { limit } => {
            let query = settings.query();
            let page = client.fetch_page(&query, None).await?;
            let mut rows = Vec::new();
            extract::flatten_into(&page.studies, unlocated(&settings), &mut rows);
            if rows.is_empty() {
                println!("No rows on the first page.");
                return Ok(());
            }
            print_table(&rows, limit);
            println!(
                "\n{} rows from {} studies | more pages: {}",
                rows.len(),
                page.studies.len(),
                if page.continuation().is_some() { "yes" } else { "no" }
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn unlocated(settings: &Settings) -> Unlocated {
    if settings.include_unlocated {
        Unlocated::Keep
    } else {
        Unlocated::Drop
    }
}

/// Walk every page and flatten as pages arrive. Nothing is kept if a page fails.
/// Each continuation token is written to `out` before it is sent.
async fn collect_rows(
    client: &StudiesClient,
    settings: &Settings,
    out: &mut impl Write,
) -> anyhow::Result<Vec<FlatRow>> {
    let query = settings.query();
    let policy = unlocated(settings);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template(
        "{spinner:.green} [{elapsed_precise}] {msg}",
    )?);

    let mut pages = client.paginate(&query).with_max_pages(settings.max_pages);
    let mut rows = Vec::new();
    let mut studies = 0usize;

    loop {
        // The spinner's draw target is hidden off a TTY, so tokens bypass it.
        if let Some(token) = pages.pending_token() {
            pb.suspend(|| writeln!(out, "{}", token))?;
        }
        let Some(page) = pages
            .next_page()
            .await
            .context("Failed to fetch studies page")?
        else {
            break;
        };
        studies += page.studies.len();
        extract::flatten_into(&page.studies, policy, &mut rows);
        pb.set_message(format!(
            "{} pages, {} studies, {} rows",
            pages.pages_fetched(),
            studies,
            rows.len()
        ));
        pb.tick();
    }

    pb.finish_and_clear();
    tracing::info!(
        "Flattened {} studies into {} rows over {} pages",
        studies,
        rows.len(),
        pages.pages_fetched()
    );
    Ok(rows)
}

fn print_table(rows: &[FlatRow], limit: usize) {
    println!(
        "{:>3} | {:<12} | {:<20} | {:<16} | {:>9} | {:>10} | {:<20}",
        "#", "Study", "City", "Country", "Lat", "Lon", "Status"
    );
    println!("{}", "-".repeat(106));

    for (i, r) in rows.iter().take(limit).enumerate() {
        let coord = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_else(|| "-".into());
        println!(
            "{:>3} | {:<12} | {:<20} | {:<16} | {:>9} | {:>10} | {:<20}",
            i + 1,
            truncate(&r.study_id, 12),
            truncate(&r.city, 20),
            truncate(&r.country, 16),
            coord(r.lat),
            coord(r.lon),
            truncate(r.status.as_deref().unwrap_or("-"), 20)
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
