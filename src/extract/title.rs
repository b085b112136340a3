//! Title heuristics: the `og:title` meta, then the first `<h1>`.

use super::Strategy;
use super::text::meta_content;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector"));

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "og:title meta",
        run: og_title,
    },
    Strategy {
        name: "first h1",
        run: first_heading,
    },
];

fn og_title(document: &Html) -> Option<String> {
    meta_content(document, "og:title")
}

fn first_heading(document: &Html) -> Option<String> {
    let h1 = document.select(&H1).next()?;
    Some(h1.text().collect::<String>().trim().to_string())
}
