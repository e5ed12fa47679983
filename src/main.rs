//! Repo-Census main entry point
//!
//! This is the command-line interface for the Repo-Census repository scraper.

use anyhow::Context;
use clap::Parser;
use repo_census::config::{load_config, Config};
use repo_census::output::{render, write_output, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Message shown when a census cannot be produced; details go to the log
const UNAVAILABLE: &str = "It was not possible to obtain results for this repository";

/// Repo-Census: lines and bytes per file extension of a public repository
///
/// Repo-Census walks a repository's file tree on the hosting service's web
/// interface, reads every file's line count and size, and groups the totals
/// by file extension.
#[derive(Parser, Debug)]
#[command(name = "repo-census")]
#[command(version)]
#[command(about = "Lines and bytes per file extension of a public repository", long_about = None)]
struct Cli {
    /// Repository to analyse, as owner/name
    #[arg(value_name = "OWNER/REPO")]
    repository: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Ignore any cached result and walk the repository again
    #[arg(long, conflicts_with = "dry_run")]
    refresh: bool,

    /// Validate config and show what would be walked without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{}", UNAVAILABLE);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("repo_census=info,warn"),
            1 => EnvFilter::new("repo_census=debug,info"),
            2 => EnvFilter::new("repo_census=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.repository)?;
        return Ok(());
    }

    let buckets = repo_census::census(&config, &cli.repository, cli.refresh)
        .await
        .with_context(|| format!("Census of {} failed", cli.repository))?;

    let rendered = render(&cli.repository, &buckets, cli.format)?;

    match &cli.output {
        Some(path) => {
            write_output(&rendered, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Result written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be walked
fn handle_dry_run(config: &Config, repository: &str) -> anyhow::Result<()> {
    let repository = repo_census::RepositoryId::parse(repository)?;
    let start = url::Url::parse(&config.scraper.base_url)?.join(&repository.start_path())?;

    println!("=== Repo-Census Dry Run ===\n");

    println!("Repository: {}", repository);
    println!("  Start page: {}", start);

    println!("\nScraper Configuration:");
    println!("  Max depth: {}", config.scraper.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.scraper.max_concurrent_fetches
    );
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.scraper.request_timeout_secs, config.scraper.connect_timeout_secs
    );
    println!(
        "  Strict size header: {}",
        config.scraper.strict_size_header
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nCache:");
    match &config.cache.database_path {
        Some(path) => println!(
            "  SQLite: {} ({} entries)",
            path, config.cache.max_entries
        ),
        None => println!("  In-memory ({} entries)", config.cache.max_entries),
    }

    println!("\nSelectors:");
    println!("  Listing rows: {}", config.selectors.listing_row);
    println!("  Row anchor: {}", config.selectors.row_anchor);
    println!("  Content rows: {}", config.selectors.content_row);
    println!("  Size header: {}", config.selectors.size_header);
    println!("  File marker: {}", config.selectors.file_marker);

    println!("\n✓ Configuration is valid");

    Ok(())
}
