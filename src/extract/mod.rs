//! Field extraction for article pages.
//!
//! Each field (title, author, publication date, content) is filled by an
//! ordered list of heuristics. A heuristic is a pure function from a parsed
//! page to an optional value; the first one to produce a non-empty value wins.
//! Extraction never fails: a field nobody can find is simply `None` (or an
//! empty `content`).
//!
//! | Field   | Heuristics, in priority order                                    |
//! |---------|-------------------------------------------------------------------|
//! | title   | `og:title` meta, first `<h1>`                                     |
//! | author  | `author` meta, byline classes / `rel=author`, `"By …"` text node  |
//! | date    | `article:published_time` meta, `<time>`, date/time classes       |
//! | content | configured containers, `<article>` paragraphs, all paragraphs     |

mod author;
mod content;
mod date;
mod text;
mod title;

use crate::config::CrawlConfig;
use crate::error::ConfigError;
use crate::models::ArticleRecord;
use scraper::{Html, Selector};
use tracing::{debug, trace};

pub use content::ContentStrategy;

/// A single heuristic for one field.
pub type Heuristic = fn(&Html) -> Option<String>;

/// A named heuristic, so logs can say which rule produced a value.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: Heuristic,
}

/// Run `strategies` in order and keep the first non-empty value.
pub fn cascade(field: &str, document: &Html, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        let value = (strategy.run)(document).filter(|v| !v.trim().is_empty())?;
        trace!(field, strategy = strategy.name, "Heuristic matched");
        Some(value)
    })
}

/// Turns a parsed article page into an [`ArticleRecord`].
#[derive(Clone)]
pub struct ArticleExtractor {
    content: Vec<ContentStrategy>,
}

impl ArticleExtractor {
    /// Build an extractor whose content cascade starts with `containers`.
    pub fn new(containers: Vec<Selector>) -> Self {
        Self {
            content: vec![
                ContentStrategy::Containers(containers),
                ContentStrategy::ArticleParagraphs,
                ContentStrategy::DocumentParagraphs,
            ],
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.compiled_content_selectors()?))
    }

    pub fn extract(&self, document: &Html, source_url: &str) -> ArticleRecord {
        let record = ArticleRecord {
            source_url: source_url.to_string(),
            title: cascade("title", document, title::STRATEGIES),
            author: cascade("author", document, author::STRATEGIES),
            publication_date: cascade("publication_date", document, date::STRATEGIES),
            content: self.content(document),
        };
        debug!(
            url = source_url,
            has_title = record.title.is_some(),
            has_author = record.author.is_some(),
            has_date = record.publication_date.is_some(),
            content_bytes = record.content.len(),
            "Extracted article fields"
        );
        record
    }

    fn content(&self, document: &Html) -> String {
        self.content
            .iter()
            .find_map(|strategy| {
                let text = strategy.apply(document).filter(|t| !t.is_empty())?;
                trace!(strategy = strategy.name(), "Content heuristic matched");
                Some(text)
            })
            .unwrap_or_default()
    }
}
