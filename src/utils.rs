//! Small helpers for log formatting and file system preparation.

use crate::error::StoreError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Truncate a string for logging purposes.
///
/// Keeps at most `max` characters (never splitting one) and appends an
/// ellipsis with the number of dropped bytes.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Make sure the directory that will hold `path` exists.
///
/// A bare file name needs no preparation.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .await
        .map_err(|source| StoreError::Directory {
            path: parent.to_path_buf(),
            source,
        })?;
    debug!(dir = %parent.display(), "Database directory ready");
    Ok(())
}
