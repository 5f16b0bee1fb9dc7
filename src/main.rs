//! listing-analyzer - Marketplace listing scraper and competitive analysis CLI
//!
//! Scrapes an offer page with TLS fingerprint emulation and asks an LLM to
//! compare it against competing listings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use listing_analyzer::analysis::AnalysisError;
use listing_analyzer::commands::{AnalyzeCommand, KeyCommand, ScrapeCommand, WatchCommand};
use listing_analyzer::config::{Config, OutputFormat};
use listing_analyzer::credentials::LayeredCredentials;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "listing-analyzer",
    version,
    about = "Marketplace listing scraper with LLM competitive analysis",
    long_about = "Scrapes marketplace offer pages into structured snapshots and rates them against competing listings using an LLM with web search."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "LISTING_PROXY")]
    proxy: Option<String>,

    /// Delay before each page fetch in milliseconds
    #[arg(long, global = true, env = "LISTING_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Model used for analysis
    #[arg(long, global = true, env = "LISTING_MODEL")]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a listing and print its snapshot
    #[command(alias = "s")]
    Scrape {
        /// Offer page URL
        url: String,

        /// Read the page from a saved HTML file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Scrape a listing and run a competitive analysis
    #[command(alias = "a")]
    Analyze {
        /// Offer page URL
        url: String,

        /// Read the page from a saved HTML file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Re-scrape a listing on an interval and print each update
    #[command(alias = "w")]
    Watch {
        /// Offer page URL
        url: String,

        /// Read the page from a saved HTML file instead of fetching it
        #[arg(long)]
        html: Option<PathBuf>,

        /// Seconds between scrapes
        #[arg(short, long, default_value = "60")]
        interval: u64,

        /// Number of scrapes
        #[arg(short, long, default_value = "5")]
        times: usize,
    },

    /// Manage the API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save an API key
    Set {
        /// The API key
        value: String,
    },

    /// Show whether a key is configured
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(model) = cli.model {
        config.analysis.model = model;
    }

    match cli.command {
        Commands::Scrape { url, html } => {
            let cmd = ScrapeCommand::new(config);
            let output = cmd.execute(&url, html.as_deref()).await?;
            println!("{}", output);
        }

        Commands::Analyze { url, html } => {
            let cmd = AnalyzeCommand::new(config);
            match cmd.execute(&url, html.as_deref()).await {
                Ok(output) => println!("{}", output),
                Err(e) => match e.downcast_ref::<AnalysisError>() {
                    Some(analysis_err) => {
                        eprintln!("Error: {}", analysis_err);
                        eprintln!("{}", analysis_err.hint());
                        if let Some(raw) = analysis_err.raw_text() {
                            tracing::debug!("Raw model output:\n{}", raw);
                        }
                        return Ok(ExitCode::FAILURE);
                    }
                    None => return Err(e),
                },
            }
        }

        Commands::Watch { url, html, interval, times } => {
            let cmd = WatchCommand::new(config);
            let delivered =
                cmd.execute(&url, html.as_deref(), Duration::from_secs(interval), times).await?;
            eprintln!("{} of {} updates received", delivered, times);
        }

        Commands::Key { action } => {
            let cmd = KeyCommand::new(LayeredCredentials::from_default_locations()?);
            let output = match action {
                KeyAction::Set { value } => cmd.set(&value)?,
                KeyAction::Status => cmd.status()?,
            };
            println!("{}", output);
        }
    }

    Ok(ExitCode::SUCCESS)
}
