//! Small helpers for logging and file system checks.

use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` characters are cut at a character boundary
/// and suffixed with `"…(+N bytes)"`.
///
/// # Arguments
///
/// * `s` - The string to truncate.
/// * `max` - Maximum number of characters kept.
///
/// # Returns
///
/// The string unchanged if short enough, otherwise the truncated prefix
/// followed by a note of how many bytes were dropped.
///
/// # Examples
///
/// ```
/// use lite_news_archive::utils::truncate_for_log;
///
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
/// A probe file that cannot be removed is logged but does not fail the check.
///
/// # Arguments
///
/// * `path` - Directory that will receive the article records.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory cannot be created or
/// written to (permission denied, read-only file system, ...).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    if let Err(e) = stdfs::remove_file(&probe_path) {
        warn!(
            probe = %probe_path.display(),
            error = %e,
            "Could not remove write probe; delete it manually"
        );
    }
    info!("Output directory is writable");
    Ok(())
}
