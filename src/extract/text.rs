//! Text helpers shared by the field heuristics.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").expect("meta selector"));

/// All text nodes under `element`, each trimmed, empties dropped, joined by
/// single spaces.
pub(super) fn joined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// The trimmed `content` of the first `<meta>` whose `property` or `name`
/// equals `key`.
pub(super) fn meta_content(document: &Html, key: &str) -> Option<String> {
    document
        .select(&META)
        .find(|meta| {
            let el = meta.value();
            el.attr("property") == Some(key) || el.attr("name") == Some(key)
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

/// Join the distinct non-empty texts of `elements` with blank lines.
pub(super) fn join_chunks<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .map(joined_text)
        .filter(|chunk| !chunk.is_empty())
        .unique()
        .join("\n\n")
}
