//! Body-text heuristics.

use super::text::join_chunks;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, div").expect("block selector"));
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("p selector"));
static ARTICLE_PARAGRAPHS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article p").expect("article paragraph selector"));

/// One step of the body-text cascade.
#[derive(Debug, Clone)]
pub enum ContentStrategy {
    /// Paragraph and block text inside the first element matched by the first
    /// selector, in order, that yields any text.
    Containers(Vec<Selector>),
    /// Paragraph text inside any `<article>`.
    ArticleParagraphs,
    /// Every paragraph in the page.
    DocumentParagraphs,
}

impl ContentStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ContentStrategy::Containers(_) => "body containers",
            ContentStrategy::ArticleParagraphs => "article paragraphs",
            ContentStrategy::DocumentParagraphs => "document paragraphs",
        }
    }

    pub fn apply(&self, document: &Html) -> Option<String> {
        match self {
            ContentStrategy::Containers(selectors) => selectors.iter().find_map(|selector| {
                let container = document.select(selector).next()?;
                let text = join_chunks(
                    container
                        .select(&BLOCKS)
                        .filter(|el| el.id() != container.id()),
                );
                Some(text).filter(|t| !t.is_empty())
            }),
            ContentStrategy::ArticleParagraphs => {
                Some(join_chunks(document.select(&ARTICLE_PARAGRAPHS)))
            }
            ContentStrategy::DocumentParagraphs => Some(join_chunks(document.select(&PARAGRAPHS))),
        }
    }
}
