//! Author heuristics.
//!
//! Meta tags are trusted first, then byline-styled elements, and finally any
//! text node that reads like `"By <name>"`. The last two return the whole
//! visible byline, so values such as `"By Jane Doe , Mumbai"` are kept as found.

use super::Strategy;
use super::text::{joined_text, meta_content};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static BYLINE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".author, .byline, .author-name, .article-author, a[rel='author']")
        .expect("byline selector")
});

static BY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^by\s+").expect("by pattern"));

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "author meta",
        run: author_meta,
    },
    Strategy {
        name: "byline element",
        run: byline_element,
    },
    Strategy {
        name: "\"By\" text",
        run: by_text,
    },
];

fn author_meta(document: &Html) -> Option<String> {
    meta_content(document, "author")
}

/// First element, in document order, matching any byline selector.
fn byline_element(document: &Html) -> Option<String> {
    document.select(&BYLINE).next().map(joined_text)
}

/// The element holding the first `"By <name>"` text node.
fn by_text(document: &Html) -> Option<String> {
    document.tree.root().descendants().find_map(|node| {
        let text = node.value().as_text()?;
        if !BY_PREFIX.is_match(text.trim_start()) {
            return None;
        }
        let parent = node.parent().and_then(ElementRef::wrap)?;
        if matches!(parent.value().name(), "script" | "style") {
            return None;
        }
        Some(joined_text(parent)).filter(|t| !t.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::cascade;

    fn author(html: &str) -> Option<String> {
        cascade("author", &Html::parse_document(html), STRATEGIES)
    }

    #[test]
    fn test_meta_wins() {
        assert_eq!(
            author(
                r#"<html><head><meta name="author" content=" Meta Person "></head>
                   <body><span class="byline">Byline Person</span></body></html>"#
            )
            .as_deref(),
            Some("Meta Person")
        );
    }

    #[test]
    fn test_byline_class_joined_with_spaces() {
        assert_eq!(
            author(
                r#"<html><body><div class="article-author">
                    <a href="/author/ravi">Ravi  Kumar</a>
                    <span>Moneycontrol News</span>
                </div></body></html>"#
            )
            .as_deref(),
            Some("Ravi  Kumar Moneycontrol News")
        );
    }

    #[test]
    fn test_rel_author_anchor() {
        assert_eq!(
            author(r#"<html><body><p>Story</p><a rel="author" href="/p/1">Priya Shah</a></body></html>"#)
                .as_deref(),
            Some("Priya Shah")
        );
    }

    #[test]
    fn test_first_byline_in_document_order() {
        assert_eq!(
            author(
                r#"<html><body><span class="byline">First</span><span class="author">Second</span></body></html>"#
            )
            .as_deref(),
            Some("First")
        );
    }

    #[test]
    fn test_by_prefix_uses_containing_element() {
        assert_eq!(
            author(
                r#"<html><body><h1>Title</h1><p class="credit">
                    by <strong>Neha Jain</strong>, Reuters</p></body></html>"#
            )
            .as_deref(),
            Some("by Neha Jain , Reuters")
        );
    }

    #[test]
    fn test_by_prefix_needs_whitespace() {
        assert_eq!(
            author("<html><body><p>Bypass road opens</p></body></html>"),
            None
        );
    }

    #[test]
    fn test_by_prefix_ignores_scripts() {
        assert_eq!(
            author("<html><body><script>By default, nothing</script></body></html>"),
            None
        );
    }

    #[test]
    fn test_empty_byline_falls_through() {
        assert_eq!(
            author(r#"<html><body><span class="author"> </span><p>By Anil Mehta</p></body></html>"#)
                .as_deref(),
            Some("By Anil Mehta")
        );
    }
}
