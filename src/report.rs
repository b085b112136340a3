//! Rendering of stored rows for the `report` subcommand.

use crate::models::StoredArticle;

const RULE_WIDTH: usize = 80;

/// One block per row: `ID`, `Title`, `Author`, `Date` and `URL` lines followed
/// by a dashed rule. Missing values print as `None`.
pub fn render_text(rows: &[StoredArticle]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    rows.iter()
        .map(|row| {
            format!(
                "ID: {}\nTitle: {}\nAuthor: {}\nDate: {}\nURL: {}\n{}\n",
                row.id,
                or_none(&row.title),
                or_none(&row.author),
                or_none(&row.publication_date),
                row.article_url,
                rule
            )
        })
        .collect()
}

/// The rows as a pretty-printed JSON array.
pub fn render_json(rows: &[StoredArticle]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}
