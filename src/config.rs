//! Crawl configuration.
//!
//! Every site-specific constant of a crawl lives in one [`CrawlConfig`] value
//! that is handed to the crawler at construction. The defaults target the
//! Moneycontrol business section; a YAML file can override any subset of keys.
//!
//! ```yaml
//! home_url: https://www.moneycontrol.com/
//! section_marker: /business/
//! request_delay_ms: 800
//! db_path: articles.db
//! ```

use crate::error::{ConfigError, StoreError};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/117.0 Safari/537.36";

/// Settings for one crawl profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Homepage scanned for section links. Also the base for relative hrefs.
    pub home_url: String,
    /// Path substring a link must contain to belong to the target section.
    pub section_marker: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause between successive article fetches.
    pub request_delay_ms: u64,
    pub db_path: PathBuf,
    pub table_name: String,
    /// Body-container selectors tried in order by the content cascade.
    pub content_selectors: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.moneycontrol.com/".to_string(),
            section_marker: "/business/".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 12,
            request_delay_ms: 800,
            db_path: PathBuf::from("articles.db"),
            table_name: "business_articles".to_string(),
            content_selectors: [
                "div.articleText",
                "div.articleContent",
                "div.article-desc",
                "div#content",
                "div#articleBody",
                "article",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl CrawlConfig {
    /// Load a configuration file, keeping defaults for keys it omits.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml(&raw)?;
        info!("Loaded crawl configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Parsed homepage URL.
    pub fn home_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.home_url).map_err(|source| ConfigError::InvalidHomeUrl {
            url: self.home_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Compile the configured content selectors, in order.
    pub fn compiled_content_selectors(&self) -> Result<Vec<Selector>, ConfigError> {
        self.content_selectors
            .iter()
            .map(|raw| {
                Selector::parse(raw).map_err(|e| ConfigError::InvalidSelector {
                    selector: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Check everything that can be checked before any network or disk I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.home_url()?;
        if self.section_marker.is_empty() {
            return Err(ConfigError::EmptySectionMarker);
        }
        self.compiled_content_selectors()?;
        if !is_sql_identifier(&self.table_name) {
            return Err(StoreError::InvalidTableName(self.table_name.clone()).into());
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
