use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command as ProcessCommand;
use tracing::{error, info, warn};

use rent_radar::config::{ApiKeys, AppConfig};
use rent_radar::demo;
use rent_radar::domain::{Listing, Source};
use rent_radar::error::RadarError;
use rent_radar::logging;
use rent_radar::pipeline::aggregate::Aggregator;
use rent_radar::pipeline::score::Scorer;
use rent_radar::report;
use rent_radar::sources::{self, ListingSource};
use rent_radar::sources::redfin::RedfinSource;
use rent_radar::sources::rentcast::RentCastSource;
use rent_radar::sources::zillow::ZillowSource;

#[derive(Parser)]
#[command(name = "rent-radar")]
#[command(about = "Rental listing aggregator with cross-source dedup and quality scoring")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, deduplicate, score, and render the dashboard
    Run {
        /// Use synthetic sample data instead of live API calls (no keys needed)
        #[arg(long)]
        demo: bool,
        /// Open the generated dashboard in a browser afterwards
        #[arg(long)]
        open: bool,
        /// Specific sources to fetch (comma-separated). Available: rentcast, zillow, redfin
        #[arg(long)]
        sources: Option<String>,
        /// Path to the configuration file
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
        /// Seed for --demo data generation
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

/// Builds the adapters that both have a credential and were requested.
/// A provider without its key is skipped with a warning; only having no
/// credentials at all (outside demo mode) is a configuration error, which
/// the caller checks before this runs.
fn build_sources(keys: &ApiKeys, requested: Option<&str>) -> Vec<Box<dyn ListingSource>> {
    let wanted: Option<Vec<Source>> = requested.map(|list| {
        list.split(',')
            .filter_map(|name| match Source::parse(name) {
                Some(source) => Some(source),
                None => {
                    warn!(name = name.trim(), "unknown source requested, ignoring");
                    None
                }
            })
            .collect()
    });
    let is_wanted =
        |source: Source| wanted.as_ref().map(|w| w.contains(&source)).unwrap_or(true);

    let mut adapters: Vec<Box<dyn ListingSource>> = Vec::new();

    if is_wanted(Source::RentCast) {
        match &keys.rentcast {
            Some(key) => adapters.push(Box::new(RentCastSource::new(key.clone()))),
            None => warn!("RENTCAST_API_KEY not set, skipping rentcast"),
        }
    }
    match &keys.rapidapi {
        Some(key) => {
            if is_wanted(Source::Zillow) {
                adapters.push(Box::new(ZillowSource::new(key.clone())));
            }
            if is_wanted(Source::Redfin) {
                adapters.push(Box::new(RedfinSource::new(key.clone())));
            }
        }
        None => {
            if is_wanted(Source::Zillow) || is_wanted(Source::Redfin) {
                warn!("RAPIDAPI_KEY not set, skipping zillow and redfin");
            }
        }
    }

    adapters
}

fn open_in_browser(path: &std::path::Path) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    if let Err(e) = ProcessCommand::new(opener).arg(path).spawn() {
        warn!("could not open dashboard in browser: {e}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            demo,
            open,
            sources: requested,
            config,
            seed,
        } => {
            let config = AppConfig::load(&config).inspect_err(|e| error!("{e}"))?;
            let now = Utc::now();

            let listings: Vec<Listing> = if demo {
                println!("🎭 Running in demo mode with sample data...");
                demo::generate_listings(&config.search, now, seed)
            } else {
                let keys = ApiKeys::from_env();
                if !keys.any_present() {
                    let e = RadarError::Config(
                        "no API keys configured; set RENTCAST_API_KEY and/or RAPIDAPI_KEY, \
                         or run with --demo to try the dashboard with sample data"
                            .to_string(),
                    );
                    error!("{e}");
                    return Err(e.into());
                }

                info!(
                    city = %config.search.city,
                    state = %config.search.state,
                    bedrooms = config.search.bedrooms,
                    "starting search"
                );
                sources::fetch_all(build_sources(&keys, requested.as_deref()), &config.search)
                    .await
            };

            let aggregated = Aggregator::new(&config.dedup).aggregate(listings);
            let entries = Scorer::new(config.weights.clone(), config.scorer.clone(), now)
                .score_batch(aggregated.listings);

            if entries.is_empty() {
                // Not an error: an empty result still produces a valid,
                // empty report.
                warn!("no listings from any source this run");
            }

            let artifacts =
                report::write_report(&entries, &config.search, &config.output, now)
                    .inspect_err(|e| error!("failed to write report: {e}"))?;

            println!("\n📊 Run results:");
            println!("   Unique listings: {}", entries.len());
            println!("   Duplicates removed: {}", aggregated.duplicates_dropped);
            println!("   Malformed dropped: {}", aggregated.malformed_dropped);
            println!(
                "   Top score: {}",
                entries.first().map(|e| e.score.to_string()).unwrap_or_else(|| "-".to_string())
            );
            println!("   Dashboard: {}", artifacts.dashboard.display());
            println!("   Data export: {}", artifacts.data.display());

            if open {
                open_in_browser(&artifacts.dashboard);
            }
        }
    }

    Ok(())
}
