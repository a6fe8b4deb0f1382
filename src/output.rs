//! Rendering bundle blocks and persisting the artifact.
//!
//! Each included file becomes:
//!
//! ```text
//! # file: <relative/posix/path>
//! <content, ending in exactly one added newline if it had none>
//!
//! ```

use crate::error::{BundlecatError, Result};
use crate::types::BundleEntry;
use std::fs;
use std::path::Path;

pub const HEADER_PREFIX: &str = "# file: ";

/// Appends one block for `entry` to `out`.
pub fn render_block(entry: &BundleEntry, out: &mut String) {
    out.reserve(HEADER_PREFIX.len() + entry.relative.len() + entry.content.len() + 3);
    out.push_str(HEADER_PREFIX);
    out.push_str(&entry.relative);
    out.push('\n');
    out.push_str(&entry.content);
    if !entry.content.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
}

/// Writes `buffer` to `destination`, replacing any existing file.
///
/// Creating the parent directory is best-effort; the write itself decides success.
pub fn write_bundle(buffer: &str, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!("Could not create {}: {}", parent.display(), e);
        }
    }
    fs::write(destination, buffer).map_err(|e| BundlecatError::io(destination, e))
}
