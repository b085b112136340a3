//! Section link discovery on the homepage.
//!
//! Every anchor on the homepage is resolved against the homepage URL, kept
//! only when it stays on the same origin and its path contains the section
//! marker, stripped of fragment and query, and collected into a set.

use crate::models::ArticleLink;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument, trace};
use url::Url;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href], area[href]").expect("anchor selector"));

/// Collect the distinct same-origin section links of a homepage.
///
/// The returned set carries no ordering; callers sort it before iterating.
/// Hrefs that cannot be resolved are dropped.
#[instrument(level = "info", skip_all, fields(home = %home_url, marker = %section_marker))]
pub fn collect_section_links(
    document: &Html,
    home_url: &Url,
    section_marker: &str,
) -> HashSet<ArticleLink> {
    let home_origin = home_url.origin();
    let mut links = HashSet::new();

    for element in document.select(&ANCHORS) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = home_url.join(href.trim()) else {
            trace!(href, "Dropping unresolvable href");
            continue;
        };

        if resolved.origin() != home_origin {
            continue;
        }
        if !resolved.path().contains(section_marker) {
            continue;
        }

        resolved.set_fragment(None);
        resolved.set_query(None);
        links.insert(ArticleLink::new(resolved.into()));
    }

    debug!(count = links.len(), "Collected section links");
    links
}
