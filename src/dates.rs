//! Publication-date normalization.
//!
//! Article pages express dates in every conceivable way: ISO timestamps in
//! meta tags, RFC 2822 strings, and free text such as
//! `"Updated: Mar 03, 2024 / 10:00 AM IST"`. [`normalize_date`] turns anything
//! it can understand into an ISO-8601 timestamp and hands back the trimmed
//! original text otherwise.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// Zone abbreviations seen on news sites, as seconds east of UTC.
const ZONE_ABBREVIATIONS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("IST", 5 * 3600 + 1800),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("BST", 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("JST", 9 * 3600),
    ("SGT", 8 * 3600),
    ("HKT", 8 * 3600),
    ("AEST", 10 * 3600),
];

/// ISO-like layouts carrying an explicit offset.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %I %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%d %B %Y %I:%M:%S %p",
    "%d %B %Y %I:%M %p",
    "%H:%M %B %d %Y",
    "%I:%M %p %B %d %Y",
    "%H:%M %d %B %Y",
    "%I:%M %p %d %B %Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:first\s+)?(?:published|updated|posted|last\s+updated|last\s+modified)(?:\s+on)?\s*:?\s*",
    )
    .expect("label pattern")
});

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)\b\.?",
    )
    .expect("weekday pattern")
});

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("ordinal pattern"));

static MONTH_DOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)t?\.").expect("month pattern")
});

static SEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").expect("sept pattern"));

static MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([ap])\.\s?m\.?").expect("meridiem pattern"));

static CONNECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(?:at|/|-{1,2}|\|)\s+").expect("connector pattern"));

static NUMERIC_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:UTC|GMT)?([+-])(\d{1,2}):?(\d{2})?$").expect("offset pattern")
});

/// A successfully parsed timestamp, with or without a known offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Parsed {
    fn to_iso(self) -> String {
        match self {
            Parsed::Zoned(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string(),
            Parsed::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Normalize free-form date text.
///
/// - `None` or blank text yields `None`.
/// - Parseable text yields an ISO-8601 timestamp; offsets are preserved
///   (`Z` renders as `+00:00`), text without a zone yields a naive timestamp
///   and date-only text yields midnight.
/// - Anything else is returned trimmed and otherwise unchanged.
pub fn normalize_date(text: Option<&str>) -> Option<String> {
    let raw = text?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(parse_permissive(raw).map_or_else(|| raw.to_string(), Parsed::to_iso))
}

fn parse_permissive(raw: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Parsed::Zoned(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(Parsed::Zoned(dt));
    }
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(Parsed::Zoned(dt));
        }
    }

    let cleaned = clean(raw);
    let (body, zone) = split_zone(&cleaned);
    let naive = parse_naive(body)?;
    match zone {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(Parsed::Zoned),
        None => Some(Parsed::Naive(naive)),
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Strip labels, weekdays, ordinals and separators, collapsing whitespace.
fn clean(raw: &str) -> String {
    let text = LABEL.replace(raw, "");
    let text = WEEKDAY.replace_all(&text, " ");
    let text = ORDINAL.replace_all(&text, "$1");
    let text = MONTH_DOT.replace_all(&text, "$1");
    let text = SEPT.replace_all(&text, "Sep");
    let text = MERIDIEM.replace_all(&text, "${1}m");
    let text = text.replace([',', '|'], " ");
    let text = CONNECTOR.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a trailing zone abbreviation or numeric offset off `text`.
fn split_zone(text: &str) -> (&str, Option<FixedOffset>) {
    if let Some((head, last)) = text.rsplit_once(' ') {
        let token = last.trim_matches(|c| c == '(' || c == ')');
        if let Some(offset) = zone_offset(token) {
            return (head.trim_end(), Some(offset));
        }
    }
    (text, None)
}

fn zone_offset(token: &str) -> Option<FixedOffset> {
    let upper = token.to_ascii_uppercase();
    if let Some((_, secs)) = ZONE_ABBREVIATIONS.iter().find(|(name, _)| *name == upper) {
        return FixedOffset::east_opt(*secs);
    }

    let caps = NUMERIC_OFFSET.captures(&upper)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let secs = hours * 3600 + minutes * 60;
    if &caps[1] == "-" {
        FixedOffset::west_opt(secs)
    } else {
        FixedOffset::east_opt(secs)
    }
}
