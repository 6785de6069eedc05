//! PaperScope ingest CLI
//!
//! Runs the ingestion pipeline once and prints the report as JSON:
//! - `ingest <keywords or URL>`
//! - `ingest --pdf <file>...`
//! - `ingest --dir <dir>`

use anyhow::Context;
use clap::Parser;
use paperscope_common::{config::AppConfig, PaperStore, VERSION};
use paperscope_ingestion::PaperPipeline;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ingest", version, about = "Fetch, summarize and store research papers", long_about = None)]
struct Cli {
    /// Keywords to search for, or a paper URL
    query: Vec<String>,

    /// PDF files to summarize
    #[arg(long, num_args = 1.., conflicts_with_all = ["query", "dir"])]
    pdf: Vec<PathBuf>,

    /// Directory of PDF files to summarize
    #[arg(long, conflicts_with = "query")]
    dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays valid JSON
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(mode = config.summarizer.mode.as_str(), "PaperScope ingest v{}", VERSION);

    let store = Arc::new(PaperStore::new(&config.storage.db_path));
    let pipeline = PaperPipeline::from_config(&config, store)?;

    let report = if let Some(dir) = cli.dir {
        pipeline.process_directory(&dir).await?
    } else if !cli.pdf.is_empty() {
        pipeline.process_files(&cli.pdf).await
    } else if !cli.query.is_empty() {
        pipeline.fetch_and_summarize(&cli.query.join(" ")).await?
    } else {
        anyhow::bail!("Nothing to do: pass keywords, a URL, --pdf or --dir");
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
