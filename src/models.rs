//! Data models shared across the crawl pipeline.
//!
//! - [`ArticleLink`]: a normalized, same-origin section link found on the homepage
//! - [`ArticleRecord`]: the fields extracted from one fetched article page
//! - [`StoredArticle`]: a persisted row as read back for reporting

use serde::{Deserialize, Serialize};
use std::fmt;

/// An absolute article URL with fragment and query removed.
///
/// Links order lexicographically so a discovery set can be turned into a
/// reproducible processing sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleLink(String);

impl ArticleLink {
    pub(crate) fn new(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured fields extracted from a single article page.
///
/// Absent fields are `None`; missing body text is an empty `content`. A record
/// is built once per fetched page and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The page the record was extracted from. Unique key in the store.
    pub source_url: String,
    pub title: Option<String>,
    pub author: Option<String>,
    /// ISO-8601 when the page's date text could be parsed, the raw text otherwise.
    pub publication_date: Option<String>,
    pub content: String,
}

impl ArticleRecord {
    /// Whether the record looks like an actual article.
    ///
    /// Pages with neither a title nor any body text (section indexes,
    /// navigation pages) are not stored.
    pub fn is_article(&self) -> bool {
        let has_title = self.title.as_deref().is_some_and(|t| !t.is_empty());
        has_title || !self.content.is_empty()
    }
}

/// A persisted article row as exposed by the store's read interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication_date: Option<String>,
    pub article_url: String,
}
