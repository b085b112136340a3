//! Page fetching and parsing.
//!
//! [`Fetcher`] is the transport seam: it turns a URL into raw markup.
//! [`fetch_document`] layers parsing on top, yielding a queryable [`Html`]
//! tree or a [`FetchError`]. Each call makes exactly one attempt.

use crate::config::CrawlConfig;
use crate::error::FetchError;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use scraper::Html;
use tracing::{debug, instrument};

/// Retrieves the markup behind a URL.
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
///
/// Redirects are followed (reqwest's default policy), the configured
/// `User-Agent` and timeout apply to every request, and non-2xx responses
/// surface as [`FetchError::Status`].
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                timeout: self.timeout_secs,
            }
        } else {
            FetchError::Http(e)
        }
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(bytes = body.len(), final_status = status.as_u16(), "Fetched page");
        Ok(body)
    }
}

/// Fetch `url` and parse it into a document tree.
pub async fn fetch_document<F: Fetcher>(fetcher: &F, url: &str) -> Result<Html, FetchError> {
    let body = fetcher.fetch(url).await?;
    parse_markup(&body)
}

/// Parse raw markup. Blank bodies are treated as a parse failure.
pub fn parse_markup(body: &str) -> Result<Html, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    Ok(Html::parse_document(body))
}
