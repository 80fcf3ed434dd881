use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use clinic_directory::app::generate_use_case::GenerateSiteUseCase;
use clinic_directory::app::load_use_case::{export_json, LoadCatalogUseCase};
use clinic_directory::app::ports::RatingLookupPort;
use clinic_directory::config::Config;
use clinic_directory::error::DirectoryError;
use clinic_directory::infra::{source_for, FsSiteOutput, PlacesRatingLookup, RatingsFileLookup};
use clinic_directory::logging;
use clinic_directory::metrics;
use clinic_directory::pipeline::processing::catalog::{group_by_community, ClinicCatalog};
use clinic_directory::pipeline::processing::enrich::{ChainedRatingLookup, RatingEnricher};
use clinic_directory::pipeline::processing::normalize::{RatingPolicy, SlugStrategy};
use clinic_directory::site::{SiteBuilder, SiteSettings};
use clinic_directory::ClinicRecord;

#[derive(Parser)]
#[command(name = "clinic_directory")]
#[command(about = "Static directory of dental clinics grouped by community")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to clinic_directory.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to the console only
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the static site
    Generate {
        /// CSV file or http(s) URL
        #[arg(long)]
        input: Option<String>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// hashed or slugify
        #[arg(long)]
        slug_strategy: Option<SlugStrategy>,
        /// none or synthetic
        #[arg(long)]
        rating_policy: Option<RatingPolicy>,
        /// Curated ratings keyed by slug
        #[arg(long)]
        ratings_file: Option<PathBuf>,
        /// Look up ratings from Google Places (needs GOOGLE_MAPS_API_KEY)
        #[arg(long)]
        live_ratings: bool,
        /// Write the Prometheus metrics text here after the run
        #[arg(long)]
        metrics_snapshot: Option<PathBuf>,
    },
    /// Search clinics by name, community or address
    Search {
        query: String,
        #[arg(long)]
        input: Option<String>,
    },
    /// Show one clinic by slug
    Show {
        slug: String,
        #[arg(long)]
        input: Option<String>,
    },
    /// Export the derived records as JSON
    Export {
        #[arg(long)]
        input: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

async fn load_catalog(config: &Config) -> clinic_directory::Result<ClinicCatalog> {
    let source = source_for(&config.source.path);
    LoadCatalogUseCase::new(source, config.normalization_policy()).load().await
}

/// Rating sources in priority order: curated file first, then the live service
async fn build_rating_lookup(config: &Config) -> anyhow::Result<Option<ChainedRatingLookup>> {
    let mut sources: Vec<Arc<dyn RatingLookupPort>> = Vec::new();

    if let Some(path) = &config.rating.ratings_file {
        let lookup = RatingsFileLookup::load(path)
            .await
            .with_context(|| format!("loading ratings file {}", path.display()))?;
        sources.push(Arc::new(lookup));
    }

    if config.rating.live {
        match config.live_api_key() {
            Some(key) => sources.push(Arc::new(PlacesRatingLookup::new(key))),
            None => warn!("Live ratings requested but no API key is configured; skipping"),
        }
    }

    let chain = ChainedRatingLookup::new(sources);
    Ok(if chain.is_empty() { None } else { Some(chain) })
}

fn print_record(record: &ClinicRecord) {
    println!("{}", record.name);
    println!("   社區: {}", record.community);
    println!("   地址: {}", record.address);
    if !record.phone.is_empty() {
        println!("   電話: {}", record.phone);
    }
    if !record.principal.is_empty() {
        println!("   負責人: {}", record.principal);
    }
    match &record.rating {
        Some(rating) if rating.is_synthetic() => println!("   星等: {:.1} (示意)", rating.value),
        Some(rating) => println!("   星等: {:.1}", rating.value),
        None => println!("   星等: 尚未提供"),
    }
    println!("   頁面: clinics/{}.html", record.slug);
    println!("   地圖: {}", record.map_url);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            input,
            out,
            slug_strategy,
            rating_policy,
            ratings_file,
            live_ratings,
            metrics_snapshot,
        } => {
            if let Some(input) = input {
                config.source.path = input;
            }
            if let Some(out) = out {
                config.site.output_dir = out;
            }
            if let Some(strategy) = slug_strategy {
                config.slug.strategy = strategy;
            }
            if let Some(policy) = rating_policy {
                config.rating.policy = policy;
            }
            if ratings_file.is_some() {
                config.rating.ratings_file = ratings_file;
            }
            config.rating.live |= live_ratings;

            println!("🔄 Generating clinic directory from {}...", config.source.path);
            let catalog = load_catalog(&config).await?;

            let builder = SiteBuilder::new(
                SiteSettings {
                    title: config.site.title.clone(),
                    data_source: config.data_source_label().to_string(),
                },
                Local::now(),
            );
            let output = FsSiteOutput::new(&config.site.output_dir);
            let mut use_case = GenerateSiteUseCase::new(builder, Box::new(output));
            if let Some(lookup) = build_rating_lookup(&config).await? {
                info!("Rating lookup enabled: {}", lookup.source_name());
                use_case = use_case.with_enricher(RatingEnricher::new(Arc::new(lookup), config.enrichment_settings()));
            }

            let (_, report) = use_case.execute(catalog).await?;

            println!("\n📊 Generation Results:");
            println!("   Clinics: {}", report.clinics);
            println!("   Communities: {}", report.communities);
            println!("   Files written: {}", report.files_written);
            println!("   Output directory: {}", config.site.output_dir.display());
            if let Some(enrichment) = report.enrichment {
                println!(
                    "   Ratings: {} found, {} without data, {} failed, {} timed out",
                    enrichment.found, enrichment.empty, enrichment.failed, enrichment.timed_out
                );
            }

            if let Some(path) = metrics_snapshot {
                match metrics::render_snapshot() {
                    Some(text) => {
                        tokio::fs::write(&path, text)
                            .await
                            .with_context(|| format!("writing metrics snapshot {}", path.display()))?;
                        println!("   Metrics snapshot: {}", path.display());
                    }
                    None => warn!("Metrics recorder is not installed; no snapshot written"),
                }
            }
        }
        Commands::Search { query, input } => {
            if let Some(input) = input {
                config.source.path = input;
            }
            let catalog = load_catalog(&config).await?;
            let hits = catalog.search(&query);
            if hits.is_empty() {
                println!("查無資料：沒有符合「{}」的診所", query);
                return Ok(());
            }

            println!("🔍 {} clinics match \"{}\"", hits.len(), query);
            for group in group_by_community(hits) {
                println!("\n{} ({})", group.community, group.len());
                for clinic in &group.clinics {
                    println!("  - {}  {}  [{}]", clinic.name, clinic.address, clinic.slug);
                }
            }
        }
        Commands::Show { slug, input } => {
            if let Some(input) = input {
                config.source.path = input;
            }
            let catalog = load_catalog(&config).await?;
            print_record(catalog.find_by_slug(&slug)?);
        }
        Commands::Export { input, output } => {
            if let Some(input) = input {
                config.source.path = input;
            }
            let catalog = load_catalog(&config).await?;
            let json = export_json(&catalog)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Exported {} clinics to {}", catalog.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let guard = logging::init_logging(!cli.no_log_file);
    metrics::init_metrics();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<DirectoryError>() {
                Some(DirectoryError::NotFound { slug }) => {
                    eprintln!("❌ 找不到診所：{}", slug);
                    2
                }
                Some(DirectoryError::Load { location, reason }) => {
                    eprintln!("❌ 無法載入資料 {}：{}", location, reason);
                    1
                }
                _ => {
                    eprintln!("❌ {:#}", e);
                    1
                }
            }
        }
    };

    drop(guard);
    std::process::exit(code);
}
