//! # Section Crawler
//!
//! Crawls one section of a news site and keeps every article it finds in a
//! local SQLite database, once per URL.
//!
//! ## Usage
//!
//! ```sh
//! section_crawler                      # crawl with built-in defaults
//! section_crawler -c profile.yaml      # crawl with a YAML profile
//! section_crawler report -n 20         # print stored rows
//! ```
//!
//! ## Architecture
//!
//! A crawl is a sequential pipeline:
//! 1. **Discovery**: fetch the homepage and collect same-origin section links
//! 2. **Fetching**: download each article page, pausing between requests
//! 3. **Extraction**: fill title, author, date and body through heuristic cascades
//! 4. **Storage**: insert into SQLite, skipping URLs already stored
//!
//! Per-article failures are logged and skipped. The process exits non-zero
//! only when the configuration is invalid, the homepage cannot be fetched or
//! the database table cannot be created.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod discovery;
mod error;
mod extract;
mod fetch;
mod models;
mod pipeline;
mod report;
mod store;
mod utils;

use cli::{Cli, Command};
use config::CrawlConfig;
use fetch::HttpFetcher;
use pipeline::Crawler;
use store::{ArticleStore, SqliteArticleStore};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("section_crawler starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => CrawlConfig::load(path).await?,
        None => CrawlConfig::default(),
    };
    if let Some(db_path) = &args.db_path {
        config.db_path = db_path.clone();
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid crawl configuration");
        return Err(e.into());
    }

    let store = SqliteArticleStore::from_config(&config)?;

    match args.command() {
        Command::Crawl => {
            let fetcher = HttpFetcher::new(&config)?;
            let crawler = Crawler::new(config, fetcher, store)?;
            let summary = match crawler.run().await {
                Ok(summary) => summary,
                Err(e) => {
                    error!(error = %e, "Crawl aborted");
                    return Err(e.into());
                }
            };
            info!(
                db = %crawler.store().db_path().display(),
                table = crawler.store().table(),
                saved = summary.saved,
                "Done"
            );
        }
        Command::Report { limit, json } => {
            store.ensure_schema().await?;
            let rows = store.recent(limit).await?;
            info!(count = rows.len(), table = store.table(), "Loaded stored articles");
            if json {
                println!("{}", report::render_json(&rows)?);
            } else {
                print!("{}", report::render_text(&rows));
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
