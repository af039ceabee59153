use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobharvest_client::{CsvExporter, JobBoardParser, ReqwestFetcher};
use jobharvest_core::classify::{classify_education, classify_experience};
use jobharvest_core::{HarvestConfig, HarvestService, RunReport};

#[derive(Parser)]
#[command(name = "jobharvest", version, about = "Job listing harvester and classifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest recent listings and export them as CSV
    Harvest(HarvestArgs),

    /// Classify a job description read from a file (or stdin with "-")
    Classify {
        /// Path to a plain-text description
        path: PathBuf,
    },
}

#[derive(Args)]
struct HarvestArgs {
    /// Directory receiving jobs_full_<date>.csv and jobs_clean_<date>.csv
    #[arg(short, long, env = "JOBHARVEST_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Country or region to search (repeatable; replaces the defaults)
    #[arg(short, long = "country")]
    countries: Vec<String>,

    /// Search keyword (repeatable; "" for an unrestricted search)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Location substring to exclude (repeatable; replaces the defaults)
    #[arg(short, long = "exclude")]
    excluded: Vec<String>,

    /// Maximum result pages per country/keyword
    #[arg(long)]
    max_pages: Option<u32>,

    /// Collect records without writing any file
    #[arg(long, default_value_t = false)]
    no_export: bool,
}

impl HarvestArgs {
    fn apply(self, mut config: HarvestConfig) -> HarvestConfig {
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if !self.countries.is_empty() {
            config.countries = self.countries;
        }
        if !self.keywords.is_empty() {
            config.keywords = self.keywords;
        }
        if !self.excluded.is_empty() {
            config.excluded_locations = self.excluded;
        }
        if let Some(max_pages) = self.max_pages {
            config.search.max_pages = max_pages;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobharvest=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest(args) => {
            let no_export = args.no_export;
            let config = HarvestConfig::default()
                .apply_env()
                .context("Invalid JOBHARVEST_* environment")?;

            cmd_harvest(args.apply(config), !no_export).await?;
        }
        Commands::Classify { path } => cmd_classify(&path)?,
    }

    Ok(())
}

async fn cmd_harvest(config: HarvestConfig, export: bool) -> Result<()> {
    let fetcher = ReqwestFetcher::new(&config.http).context("Failed to create HTTP client")?;
    let exporter = CsvExporter::new(&config.output_dir);
    let service = HarvestService::new(fetcher, JobBoardParser::new(), exporter, config);
    let run_date = chrono::Local::now().date_naive();

    let harvest = service.harvest(run_date).await.context("Harvest failed")?;

    let mut report = harvest.report;
    if !export {
        tracing::info!(records = harvest.records.len(), "Export disabled");
    } else if let Some(files) = service
        .export(&harvest.records, run_date)
        .with_context(|| {
            format!(
                "Failed to save {} records to {}",
                harvest.records.len(),
                service.config().output_dir.display()
            )
        })?
    {
        report.full_file = Some(files.full);
        report.clean_file = Some(files.clean);
    }
    log_report(&report);

    Ok(())
}

fn cmd_classify(path: &Path) -> Result<()> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read description file: {}", path.display()))?
    };

    println!("Niveau Étude: {}", classify_education(Some(&text)));
    println!("Experience:   {}", classify_experience(Some(&text)));

    Ok(())
}

fn log_report(report: &RunReport) {
    tracing::info!(
        segments = report.segments,
        pages = report.pages_fetched,
        failed_pages = report.failed_pages,
        unique_listings = report.unique_listings,
        malformed = report.malformed_references,
        excluded = report.excluded,
        fetch_failures = report.fetch_failures,
        item_errors = report.item_errors,
        "Run finished"
    );
    match (&report.full_file, &report.clean_file) {
        (Some(full), Some(clean)) => tracing::info!(
            records = report.records,
            "Data saved to {} and {}",
            full.display(),
            clean.display()
        ),
        _ => tracing::info!(records = report.records, "No file written"),
    }
}
