use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arxivist::config;
use arxivist::shell::{Console, RunMode, Services, Shell};
use arxivist::sources::{ArxivSource, SemanticScholarSource};
use arxivist::storage::{init_db, SqliteGateway};
use arxivist::ui;
use arxivist::utils::HttpClient;

/// arxivist - search arXiv and keep a local library of papers and their references
#[derive(Parser, Debug)]
#[command(name = "arxivist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive shell for searching and saving arXiv papers", long_about = None)]
struct Cli {
    /// Run mode: `prod` reports errors and keeps going, `dev` stops on the first one
    #[arg(value_enum, value_name = "RUN_MODE")]
    run_mode: RunMode,

    /// Key-value file loaded into the environment before reading settings
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so they stay out of the prompt
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxivist={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::load(&cli.env_file)?;
    tracing::info!(run_mode = %cli.run_mode, database = %config.database.path.display(), "Starting");

    init_db(&config.database.path)
        .with_context(|| format!("failed to initialise {}", config.database.path.display()))?;

    let http = HttpClient::new()?;
    let source = ArxivSource::with_api_url(http.clone(), config.search.api_url.clone());
    let references = SemanticScholarSource::new(
        http.clone(),
        config.references.api_url.clone(),
        config.references.max_results,
    )
    .api_key(config.references.api_key.clone());
    let gateway = SqliteGateway::new(
        config.database.path.clone(),
        config.downloads.directory.clone(),
        http,
        Arc::new(references),
    );

    ui::set_colors(ui::is_terminal());

    let services = Services {
        source: &source,
        gateway: &gateway,
        catalog: &gateway,
        search: &config.search,
        suggestion_limit: config.references.suggestion_limit,
    };
    let mut shell = Shell::new(services, Console::stdio(), cli.run_mode);
    shell.run().await?;

    Ok(())
}
