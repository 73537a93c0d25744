//! Site-Analyzer main entry point
//!
//! This is the command-line interface for the Site-Analyzer page reporter.

use clap::Parser;
use site_analyzer::analyzer::{validate_target_url, Analyzer};
use site_analyzer::config::{load_config, validate, Config};
use site_analyzer::output::{generate_markdown_report, print_report};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Analyzer: a single-page structure and link health reporter
///
/// Fetches one page, reports its title, HTML version, headings and login
/// form, and probes every link on it for accessibility.
#[derive(Parser, Debug)]
#[command(name = "site-analyzer")]
#[command(version)]
#[command(about = "Analyze the structure and links of a web page", long_about = None)]
struct Cli {
    /// URL of the page to analyze
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// List every link with its classification and accessibility
    #[arg(long)]
    links: bool,

    /// Also write a markdown report to this file
    #[arg(long, value_name = "FILE")]
    markdown: Option<PathBuf>,

    /// Override the maximum number of concurrent link probes
    #[arg(long, value_name = "N")]
    max_concurrent_probes: Option<usize>,

    /// Override the overall analysis deadline in milliseconds
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    validate_target_url(&cli.url)?;

    let analyzer = Analyzer::new(config)?;
    let deadline = analyzer.config().http.analysis_deadline();

    // Ctrl-C cancels the fetch and any outstanding probes
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling analysis");
                cancel.cancel();
            }
        });
    }

    let result = match analyzer
        .analyze_with_deadline(&cli.url, &cancel, deadline)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Analysis failed: {}", e);
            return Err(e.into());
        }
    };

    if !cli.quiet {
        print_report(&result, cli.links);
    }

    if let Some(path) = &cli.markdown {
        generate_markdown_report(&result, path)?;
        tracing::info!("Markdown report written to {}", path.display());
    }

    Ok(())
}

/// Loads the configuration file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(limit) = cli.max_concurrent_probes {
        config.http.max_concurrent_probes = limit;
    }
    if let Some(deadline) = cli.deadline_ms {
        config.http.analysis_deadline_ms = deadline;
    }

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_analyzer=warn,warn"),
            1 => EnvFilter::new("site_analyzer=info,warn"),
            2 => EnvFilter::new("site_analyzer=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
