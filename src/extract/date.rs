//! Publication-date heuristics. Every candidate goes through
//! [`normalize_date`](crate::dates::normalize_date).

use super::Strategy;
use super::text::{joined_text, meta_content};
use crate::dates::normalize_date;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").expect("time selector"));

static DATE_CLASSES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".date, .time, .publishing-date, .article-date").expect("date selector")
});

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "article:published_time meta",
        run: published_time_meta,
    },
    Strategy {
        name: "time element",
        run: time_element,
    },
    Strategy {
        name: "date class",
        run: date_class,
    },
];

fn published_time_meta(document: &Html) -> Option<String> {
    normalize_date(meta_content(document, "article:published_time").as_deref())
}

/// Machine-readable `datetime` of the first `<time>`, or its visible text.
fn time_element(document: &Html) -> Option<String> {
    let time = document.select(&TIME).next()?;
    match time.value().attr("datetime").filter(|v| !v.trim().is_empty()) {
        Some(datetime) => normalize_date(Some(datetime)),
        None => normalize_date(Some(&joined_text(time))),
    }
}

fn date_class(document: &Html) -> Option<String> {
    let element = document.select(&DATE_CLASSES).next()?;
    normalize_date(Some(&joined_text(element)))
}
