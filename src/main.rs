//! Catalog-Walker main entry point
//!
//! This is the command-line interface for the Catalog-Walker catalog crawler.

use catalog_walker::config::{load_config_with_hash, Config};
use catalog_walker::crawler::{run_crawl, Coordinator};
use catalog_walker::output::{print_statistics, CsvExporter};
use catalog_walker::CatalogError;
use clap::Parser;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Catalog-Walker: a polite online catalog crawler
///
/// Catalog-Walker discovers the category tree of a catalog site, walks every
/// leaf category listing and exports the deduplicated product offers to a
/// CSV file.
#[derive(Parser, Debug)]
#[command(name = "catalog-walker")]
#[command(version)]
#[command(about = "A polite online catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and list the leaf categories without crawling products
    #[arg(long, conflicts_with = "output")]
    dry_run: bool,

    /// Write the CSV here instead of the configured output path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The log file location comes from the config, so read it first
    let loaded = load_config_with_hash(&cli.config);
    let log_path = loaded.as_ref().ok().map(|(config, _)| config.log_path());
    setup_logging(cli.verbose, cli.quiet, log_path.as_deref());

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match loaded {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(config).await?;
    } else {
        handle_crawl(config, cli.output).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Events go to the console and, when `log_path` is given, are appended to
/// that file as well.
fn setup_logging(verbose: u8, quiet: bool, log_path: Option<&Path>) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_walker=info,warn"),
            1 => EnvFilter::new("catalog_walker=debug,info"),
            2 => EnvFilter::new("catalog_walker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let file_layer = log_path.and_then(open_log_file).map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Opens the log file for appending, creating its directory if needed
fn open_log_file(path: &Path) -> Option<File> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && fs::create_dir_all(dir).is_err() {
            eprintln!("Cannot create log directory {}", dir.display());
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Handles the --dry-run mode: validates config and lists the leaf categories
async fn handle_dry_run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Catalog-Walker Dry Run ===\n");

    println!("Site: {}", config.url);
    println!("Page size: {}", config.page_size);
    println!("User agent: {}", config.user_agent);
    println!("Sub-menu pattern: {}", config.pattern_sub_menu);

    println!("\nPoliteness:");
    println!(
        "  Delay before each request: {}s - {}s",
        config.delay_range_s[0], config.delay_range_s[1]
    );
    println!(
        "  Reconnect cycles: {} (every {}s)",
        config.restart.restart_count, config.restart.interval_m
    );
    println!("  Requests per cycle: {}", config.max_retries);

    println!("\nOutput:");
    println!("  CSV: {}", config.output_path().display());
    println!("  Log: {}", config.log_path().display());

    println!("\nAllowed Categories ({}):", config.categories.len());
    for category in &config.categories {
        println!("  - {}", category);
    }

    println!("\n✓ Configuration is valid");

    let mut coordinator = Coordinator::from_config(config)?;
    let leaves = coordinator.discover_categories().await?;

    println!("\nLeaf Categories ({}):", leaves.len());
    for leaf in &leaves {
        println!("  - {} ({})", leaf.category.path(), leaf.url);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_path = output.unwrap_or_else(|| config.output_path());
    let exporter = CsvExporter::new(output_path);

    tracing::info!(
        "Crawling {} ({} allowed categories)",
        config.url,
        config.categories.len()
    );
    tracing::info!("Output file: {}", exporter.path().display());

    match run_crawl(config, &exporter).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e @ CatalogError::ConnectionFailure { .. }) => {
            tracing::error!("Network unavailable, nothing was exported: {}", e);
            Err(e.into())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
