use anyhow::{Context, Result};
use tracing::debug;

/// Copy transcript text to the system clipboard.
///
/// An empty transcript is a no-op: the clipboard is not touched and no
/// confirmation should be shown. Returns whether anything was copied.
pub fn copy_text(text: &str) -> Result<bool> {
    if text.is_empty() {
        debug!("Copy skipped: transcript is empty");
        return Ok(false);
    }

    let mut clipboard =
        arboard::Clipboard::new().context("Failed to access the system clipboard")?;

    clipboard
        .set_text(text.to_string())
        .context("Failed to write to the clipboard")?;

    Ok(true)
}
