//! Error types for the crawl pipeline.
//!
//! Per-item failures ([`FetchError`], [`StoreError`]) are caught at the
//! orchestrator boundary and logged; only [`CrawlError`] and [`ConfigError`]
//! end a run early.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a usable document for one URL.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-2xx status.
    #[error("server responded with status {status}")]
    Status { status: u16 },

    /// The response body held no markup to parse.
    #[error("response body is empty")]
    EmptyBody,
}

/// Unexpected failure of the backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid table name {0:?}: expected a plain SQL identifier")]
    InvalidTableName(String),

    #[error("failed to prepare database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid or unreadable crawl configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid home URL {url:?}: {source}")]
    InvalidHomeUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid content selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("section marker must not be empty")]
    EmptySectionMarker,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures that stop a crawl before any article is processed.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("homepage {url} is unreachable: {source}")]
    HomepageUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to prepare article store: {0}")]
    Schema(#[source] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
