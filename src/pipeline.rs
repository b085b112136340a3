//! Crawl orchestration.
//!
//! One run fetches the homepage, discovers section links, prepares the store
//! and then walks the links in sorted order, one at a time:
//!
//! ```text
//! fetch ──▶ extract ──▶ is_article? ──▶ upsert
//!   │                       │              ├─▶ saved
//!   └─▶ fetch-failed        └─▶ skipped-   ├─▶ skipped-duplicate
//!                               no-content └─▶ error
//! ```
//!
//! Only homepage and schema failures end a run early. Every per-link failure
//! is logged and counted, and the loop moves on.

use crate::config::CrawlConfig;
use crate::discovery::collect_section_links;
use crate::error::{CrawlError, FetchError, StoreError};
use crate::extract::ArticleExtractor;
use crate::fetch::{Fetcher, fetch_document};
use crate::models::ArticleLink;
use crate::store::{ArticleStore, UpsertOutcome};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use url::Url;

const TITLE_LOG_CHARS: usize = 60;

/// Terminal state of one discovered link.
#[derive(Debug)]
pub enum LinkOutcome {
    Stored { id: i64 },
    Duplicate,
    /// Neither a title nor any body text was found.
    Rejected,
    FetchFailed(FetchError),
    StoreFailed(StoreError),
}

impl LinkOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            LinkOutcome::Stored { .. } => "saved",
            LinkOutcome::Duplicate => "skipped-duplicate",
            LinkOutcome::Rejected => "skipped-no-content",
            LinkOutcome::FetchFailed(_) => "fetch-failed",
            LinkOutcome::StoreFailed(_) => "error",
        }
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub fetch_failed: usize,
    pub errors: usize,
    /// Rows in the store after the run. `None` when the store was never
    /// touched or could not be counted.
    pub stored_rows: Option<i64>,
}

impl RunSummary {
    fn record(&mut self, outcome: &LinkOutcome) {
        match outcome {
            LinkOutcome::Stored { .. } => self.saved += 1,
            LinkOutcome::Duplicate => self.duplicates += 1,
            LinkOutcome::Rejected => self.rejected += 1,
            LinkOutcome::FetchFailed(_) => self.fetch_failed += 1,
            LinkOutcome::StoreFailed(_) => self.errors += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.saved + self.duplicates + self.rejected + self.fetch_failed + self.errors
    }
}

/// Runs crawls for one [`CrawlConfig`] against a fetcher and a store.
pub struct Crawler<F, S> {
    config: CrawlConfig,
    home_url: Url,
    extractor: ArticleExtractor,
    fetcher: F,
    store: S,
}

impl<F: Fetcher, S: ArticleStore> Crawler<F, S> {
    pub fn new(config: CrawlConfig, fetcher: F, store: S) -> Result<Self, CrawlError> {
        let home_url = config.home_url()?;
        let extractor = ArticleExtractor::from_config(&config)?;
        Ok(Self {
            config,
            home_url,
            extractor,
            fetcher,
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Crawl the section once.
    #[instrument(level = "info", skip_all, fields(home = %self.home_url))]
    pub async fn run(&self) -> Result<RunSummary, CrawlError> {
        info!("Fetching homepage");
        let links = {
            let homepage = fetch_document(&self.fetcher, self.home_url.as_str())
                .await
                .map_err(|source| CrawlError::HomepageUnreachable {
                    url: self.home_url.to_string(),
                    source,
                })?;
            collect_section_links(&homepage, &self.home_url, &self.config.section_marker)
        };
        info!(
            count = links.len(),
            marker = %self.config.section_marker,
            "Discovered section links"
        );

        let mut summary = RunSummary {
            discovered: links.len(),
            ..RunSummary::default()
        };
        if links.is_empty() {
            warn!("No section links found; nothing to crawl");
            return Ok(summary);
        }

        self.store.ensure_schema().await.map_err(CrawlError::Schema)?;

        let total = links.len();
        let delay = self.config.request_delay();
        let outcomes: Vec<LinkOutcome> = stream::iter(links.into_iter().sorted().enumerate())
            .then(|(idx, link)| async move {
                if idx > 0 {
                    pause(delay).await;
                }
                let outcome = self.process(&link).await;
                log_outcome(idx + 1, total, &link, &outcome);
                outcome
            })
            .collect()
            .await;

        for outcome in &outcomes {
            summary.record(outcome);
        }

        summary.stored_rows = match self.store.count().await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(error = %e, "Could not count stored rows");
                None
            }
        };

        info!(
            discovered = summary.discovered,
            processed = summary.processed(),
            saved = summary.saved,
            duplicates = summary.duplicates,
            rejected = summary.rejected,
            fetch_failed = summary.fetch_failed,
            errors = summary.errors,
            stored_rows = ?summary.stored_rows,
            "Crawl complete"
        );
        Ok(summary)
    }

    async fn process(&self, link: &ArticleLink) -> LinkOutcome {
        let record = match fetch_document(&self.fetcher, link.as_str()).await {
            Ok(document) => self.extractor.extract(&document, link.as_str()),
            Err(e) => return LinkOutcome::FetchFailed(e),
        };

        if !record.is_article() {
            return LinkOutcome::Rejected;
        }

        if let Some(title) = record.title.as_deref() {
            info!(url = %link, title = %truncate_for_log(title, TITLE_LOG_CHARS), "Extracted article");
        }

        match self.store.upsert(&record).await {
            Ok(UpsertOutcome::Inserted { id }) => LinkOutcome::Stored { id },
            Ok(UpsertOutcome::Duplicate) => LinkOutcome::Duplicate,
            Err(e) => LinkOutcome::StoreFailed(e),
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn log_outcome(position: usize, total: usize, link: &ArticleLink, outcome: &LinkOutcome) {
    let label = outcome.label();
    match outcome {
        LinkOutcome::Stored { id } => info!(position, total, url = %link, id, outcome = label, "Article saved"),
        LinkOutcome::Duplicate => info!(position, total, url = %link, outcome = label, "Already stored"),
        LinkOutcome::Rejected => warn!(position, total, url = %link, outcome = label, "No title or content; probably not an article"),
        LinkOutcome::FetchFailed(e) => warn!(position, total, url = %link, outcome = label, error = %e, "Could not fetch article"),
        LinkOutcome::StoreFailed(e) => error!(position, total, url = %link, outcome = label, error = %e, "Could not store article"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, StoredArticle};
    use crate::store::SqliteArticleStore;
    use std::collections::HashMap;
    use tempfile::{TempDir, tempdir};

    const HOME: &str = "https://www.news.example/";

    /// Serves canned pages by URL; anything else is a 404.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    impl FixtureFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            }
        }
    }

    impl Fetcher for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or(FetchError::Status { status: 404 })
        }
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    impl ArticleStore for BrokenStore {
        async fn ensure_schema(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn upsert(&self, _record: &ArticleRecord) -> Result<UpsertOutcome, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn recent(&self, _limit: u32) -> Result<Vec<StoredArticle>, StoreError> {
            Ok(Vec::new())
        }

        async fn count(&self) -> Result<i64, StoreError> {
            Ok(0)
        }
    }

    /// A store that cannot even create its table.
    struct NoSchemaStore;

    impl ArticleStore for NoSchemaStore {
        async fn ensure_schema(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn upsert(&self, _record: &ArticleRecord) -> Result<UpsertOutcome, StoreError> {
            Ok(UpsertOutcome::Duplicate)
        }

        async fn recent(&self, _limit: u32) -> Result<Vec<StoredArticle>, StoreError> {
            Ok(Vec::new())
        }

        async fn count(&self) -> Result<i64, StoreError> {
            Ok(0)
        }
    }

    const HOMEPAGE: &str = r#"<html><body>
        <a href="/business/markets/rally-1.html">Rally</a>
        <a href="/business/economy/gdp-2.html#top">GDP</a>
        <a href="https://www.news.example/business/missing-3.html">Missing</a>
        <a href="https://other.example/business/foreign.html">Foreign</a>
        <a href="https://cdn.news.example/business/asset.html">Asset</a>
        <a href="/sports/cricket-4.html">Cricket</a>
    </body></html>"#;

    const RALLY: &str = r#"<html><head>
        <meta property="og:title" content="Markets rally">
        <meta name="author" content="Asha Rao">
        <meta property="article:published_time" content="2024-03-03T10:00:00+05:30">
    </head><body><div class="articleText"><p>Stocks rose.</p></div></body></html>"#;

    const GDP: &str = r#"<html><body>
        <h1>GDP grows 8%</h1>
        <p class="byline">By Ravi Kumar</p>
        <time>March 3, 2024 10:00 IST</time>
        <article><p>Growth beat estimates.</p></article>
    </body></html>"#;

    fn config() -> CrawlConfig {
        CrawlConfig {
            home_url: HOME.to_string(),
            request_delay_ms: 0,
            ..CrawlConfig::default()
        }
    }

    fn site() -> FixtureFetcher {
        FixtureFetcher::new(&[
            (HOME, HOMEPAGE),
            ("https://www.news.example/business/markets/rally-1.html", RALLY),
            ("https://www.news.example/business/economy/gdp-2.html", GDP),
        ])
    }

    fn sqlite(dir: &TempDir) -> SqliteArticleStore {
        SqliteArticleStore::new(&dir.path().join("articles.db"), "business_articles").unwrap()
    }

    #[tokio::test]
    async fn test_crawl_stores_reachable_articles() {
        let dir = tempdir().unwrap();
        let crawler = Crawler::new(config(), site(), sqlite(&dir)).unwrap();

        let summary = crawler.run().await.unwrap();
        assert_eq!(summary.discovered, 3);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.fetch_failed, 1);
        assert_eq!(summary.processed(), 3);
        assert_eq!(summary.stored_rows, Some(2));

        let rows = crawler.store().recent(10).await.unwrap();
        let urls: Vec<&str> = rows.iter().map(|r| r.article_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.news.example/business/economy/gdp-2.html",
                "https://www.news.example/business/markets/rally-1.html",
            ]
        );
        assert_eq!(rows[0].title.as_deref(), Some("GDP grows 8%"));
        assert_eq!(rows[0].author.as_deref(), Some("By Ravi Kumar"));
        assert_eq!(
            rows[0].publication_date.as_deref(),
            Some("2024-03-03T10:00:00+05:30")
        );
        assert_eq!(rows[1].author.as_deref(), Some("Asha Rao"));
    }

    #[tokio::test]
    async fn test_rerun_reports_duplicates_without_growth() {
        let dir = tempdir().unwrap();
        let crawler = Crawler::new(config(), site(), sqlite(&dir)).unwrap();

        crawler.run().await.unwrap();
        let second = crawler.run().await.unwrap();

        assert_eq!(second.saved, 0);
        assert_eq!(second.duplicates, 2);
        assert_eq!(second.fetch_failed, 1);
        assert_eq!(second.stored_rows, Some(2));
    }

    #[tokio::test]
    async fn test_page_without_title_or_content_is_rejected() {
        let dir = tempdir().unwrap();
        let fetcher = FixtureFetcher::new(&[
            (HOME, r#"<html><body><a href="/business/">Business</a></body></html>"#),
            (
                "https://www.news.example/business/",
                r#"<html><body><nav><a href="/business/x">X</a></nav></body></html>"#,
            ),
        ]);
        let crawler = Crawler::new(config(), fetcher, sqlite(&dir)).unwrap();

        let summary = crawler.run().await.unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.stored_rows, Some(0));
    }

    #[tokio::test]
    async fn test_store_failures_do_not_stop_the_batch() {
        let crawler = Crawler::new(config(), site(), BrokenStore).unwrap();

        let summary = crawler.run().await.unwrap();
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.fetch_failed, 1);
        assert_eq!(summary.processed(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_homepage_is_fatal() {
        let crawler = Crawler::new(config(), FixtureFetcher::new(&[]), BrokenStore).unwrap();

        let err = crawler.run().await.unwrap_err();
        assert!(matches!(
            err,
            CrawlError::HomepageUnreachable {
                source: FetchError::Status { status: 404 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_schema_failure_is_fatal() {
        let crawler = Crawler::new(config(), site(), NoSchemaStore).unwrap();
        assert!(matches!(crawler.run().await, Err(CrawlError::Schema(_))));
    }

    #[tokio::test]
    async fn test_no_links_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let fetcher = FixtureFetcher::new(&[(HOME, "<html><body><p>Quiet day</p></body></html>")]);
        let crawler = Crawler::new(config(), fetcher, sqlite(&dir)).unwrap();

        let summary = crawler.run().await.unwrap();
        assert_eq!(summary, RunSummary::default());
        assert!(!dir.path().join("articles.db").exists());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(LinkOutcome::Stored { id: 1 }.to_string(), "saved");
        assert_eq!(LinkOutcome::Duplicate.label(), "skipped-duplicate");
        assert_eq!(LinkOutcome::Rejected.label(), "skipped-no-content");
        assert_eq!(
            LinkOutcome::FetchFailed(FetchError::EmptyBody).label(),
            "fetch-failed"
        );
        assert_eq!(
            LinkOutcome::StoreFailed(StoreError::InvalidTableName("x".into())).label(),
            "error"
        );
    }
}
