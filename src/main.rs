mod catalog;
mod config;
mod convert;
mod driver;
mod extract;
mod fetch;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::catalog::Catalog;
use crate::config::EnrichConfig;

const DEFAULT_CATALOG: &str = "exampleSite/data/webstack.yml";
const DEFAULT_DATASET: &str = "exampleSite/data/output.json";
const DEFAULT_CONVERT_OUT: &str = "exampleSite/data/webstack2.yml";

#[derive(Parser)]
#[command(
    name = "webstack_tools",
    about = "Web directory catalog converter and site metadata enrichment"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the flat JSON dataset into the categorized YAML catalog
    Convert {
        /// Source JSON dataset
        #[arg(short, long, default_value = DEFAULT_DATASET)]
        input: PathBuf,
        /// Catalog file to write
        #[arg(short, long, default_value = DEFAULT_CONVERT_OUT)]
        output: PathBuf,
    },
    /// Fetch descriptions and favicons for records still missing them
    Enrich {
        /// Catalog file to enrich in place
        #[arg(short, long, default_value = DEFAULT_CATALOG)]
        file: PathBuf,
        /// Max records to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Overwrite every record's description with its fetched page title
    Titles {
        /// Catalog file to rewrite in place
        #[arg(short, long, default_value = DEFAULT_CATALOG)]
        file: PathBuf,
        /// Max records to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show catalog counts
    Stats {
        #[arg(short, long, default_value = DEFAULT_CATALOG)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { input, output } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading dataset {}", input.display()))?;
            let data: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing dataset {}", input.display()))?;
            let catalog = convert::convert(&data)?;
            if catalog.categories.is_empty() {
                println!("No categories with usable links in {}.", input.display());
                return Ok(());
            }
            catalog.save(&output)?;
            println!(
                "Converted {} categories ({} links) to {}",
                catalog.categories.len(),
                catalog.site_count(),
                output.display()
            );
            Ok(())
        }
        Commands::Enrich { file, limit } => {
            let mut catalog = Catalog::load(&file)?;
            let counts = catalog.stats();
            if counts.with_url == 0 {
                println!(
                    "No records with URLs in {}. Run 'convert' first.",
                    file.display()
                );
                return Ok(());
            }
            println!(
                "Enriching {} of {} sites (saving to {} as it goes)...",
                counts.with_url,
                counts.sites,
                file.display()
            );
            let cfg = EnrichConfig::default();
            let stats = driver::enrich_catalog(&mut catalog, &cfg, &file, limit).await?;
            println!(
                "Done: {} processed, {} skipped, {} checkpoints.",
                stats.processed, stats.skipped, stats.checkpoints
            );
            Ok(())
        }
        Commands::Titles { file, limit } => {
            let mut catalog = Catalog::load(&file)?;
            let counts = catalog.stats();
            if counts.with_url == 0 {
                println!(
                    "No records with URLs in {}. Run 'convert' first.",
                    file.display()
                );
                return Ok(());
            }
            println!(
                "Retitling {} of {} sites (saving to {} as it goes)...",
                counts.with_url,
                counts.sites,
                file.display()
            );
            let cfg = EnrichConfig::default();
            let stats = driver::retitle_catalog(&mut catalog, &cfg, &file, limit).await?;
            println!(
                "Done: {} processed, {} checkpoints.",
                stats.processed, stats.checkpoints
            );
            Ok(())
        }
        Commands::Stats { file } => {
            let catalog = Catalog::load(&file)?;
            let s = catalog.stats();
            println!("Categories: {}", s.categories);
            println!("Sites:      {}", s.sites);
            println!("With URL:   {}", s.with_url);
            println!("Described:  {}", s.described);
            println!("With logo:  {}", s.with_logo);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
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
