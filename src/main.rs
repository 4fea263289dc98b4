//! pubmed-papers - PubMed papers with industry-affiliated authors
//!
//! ## Usage
//!
//! ```bash
//! pubmed-papers "cancer immunotherapy" --file results.csv
//! pubmed-papers "crispr AND 2023[dp]" --debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pubmed_papers::{config::ClientConfig, export, pubmed::PubMedClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch research papers from PubMed with authors affiliated with pharma/biotech companies
#[derive(Parser)]
#[command(name = "pubmed-papers")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query (supports full PubMed query syntax)
    query: String,

    /// Print debug information during execution
    #[arg(short, long)]
    debug: bool,

    /// Save the results to this file instead of printing them
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Maximum number of search results to fetch
    #[arg(short = 'n', long, default_value_t = pubmed_papers::config::DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// NCBI API key
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Contact email sent to NCBI
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// E-utilities base URL (mirror or test server)
    #[arg(long, default_value = pubmed_papers::config::DEFAULT_BASE_URL)]
    base_url: String,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure CSV
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if cli.debug {
                eprintln!("{:?}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        max_results: cli.max_results,
        api_key: cli.api_key.clone(),
        email: cli.email.clone(),
        ..Default::default()
    };
    let client = PubMedClient::new(config).context("Failed to create PubMed client")?;

    let papers = client.get_papers(&cli.query).await;

    if papers.is_empty() {
        eprintln!("No papers found matching the criteria.");
        return Ok(ExitCode::FAILURE);
    }

    match &cli.file {
        Some(path) => {
            export::save_csv(path, &papers)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Results saved to {}", path.display());
        }
        None => {
            let csv = export::to_csv(&papers).context("Failed to render CSV")?;
            print!("{}", csv);
        }
    }

    Ok(ExitCode::SUCCESS)
}
