mod error;

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser, Subcommand};
use exn::ResultExt;
use hymnal_catalog::Catalog;
use hymnal_config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hymnal", version, about = "Find hymn pages on hymnary.org by title")]
struct Cli {
    /// Configuration file [default: hymnal.toml in the platform config directory]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more; repeat for trace output (overrides RUST_LOG)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download (or reuse from cache) the hymn sitemaps and build the catalog
    Load {
        /// Rebuild even if the catalog is already loaded, re-reading the index
        #[arg(long)]
        force: bool,
    },
    /// Print hymns whose title matches QUERY as `title<TAB>url`
    Search {
        /// Maximum number of results [default: max_results from configuration]
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
        #[arg(required = true)]
        query: Vec<String>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(cache_dir = %config.cache_dir.display(), index_url = %config.index_url, "Configuration loaded");
    let catalog = Catalog::from_config(&config).or_raise(|| ErrorKind::Catalog)?;

    match cli.command {
        Command::Load { force: false } => {
            let records = catalog.ensure_loaded().await.or_raise(|| ErrorKind::Catalog)?;
            println!("{records} hymns loaded");
        },
        Command::Load { force: true } => {
            let report = catalog.refresh().await.or_raise(|| ErrorKind::Catalog)?;
            println!(
                "{} hymns loaded from {} sitemaps ({} skipped)",
                report.records,
                report.sources,
                report.failures.len()
            );
            for failure in &report.failures {
                eprintln!("skipped {}: {}", failure.url, *failure.error);
            }
        },
        Command::Search { max_results, query } => {
            let query = query.join(" ");
            let max_results = max_results.unwrap_or(config.max_results);
            let found = catalog.search(&query, max_results).await.or_raise(|| ErrorKind::Catalog)?;
            if found.is_empty() {
                eprintln!("No hymns found for \"{query}\"");
            }
            for hymn in found {
                println!("{}\t{}", hymn.title(), hymn.url());
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}
