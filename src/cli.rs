//! Command-line interface definitions for the section crawler.
//!
//! All options can be provided via command-line flags or environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crawl a news section into SQLite, or print what has been stored.
///
/// # Examples
///
/// ```sh
/// # Crawl with built-in defaults
/// section_crawler
///
/// # Crawl another profile into another database
/// section_crawler -c markets.yaml --db-path data/markets.db crawl
///
/// # Show the first 5 stored rows as JSON
/// section_crawler report -n 5 --json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML crawl profile
    #[arg(short, long, env = "CRAWLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides `db_path` from the profile)
    #[arg(long, env = "CRAWLER_DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Crawl the section once (the default)
    Crawl,
    /// Print stored articles in insertion order
    Report {
        /// Maximum number of rows to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: u32,

        /// Print rows as a JSON array
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Crawl)
    }
}
