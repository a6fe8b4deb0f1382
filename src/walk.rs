use crate::error::{BundlecatError, Result};
use crate::exclude::ExclusionRules;
use crate::options::ExtensionFilter;
use crate::types::FileCandidate;
use ignore::{DirEntry, WalkBuilder};
use std::io;
use std::path::{Component, Path};

/// Fails unless `root` exists and is a directory.
pub fn validate_root(root: &Path) -> Result<()> {
    match root.metadata() {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BundlecatError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(BundlecatError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(BundlecatError::io(root, e)),
    }
}

/// `path` relative to `root` with `/` separators. `None` when outside the root.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Every regular file under `root` that the rules and filter let through,
/// sorted by relative path and deduplicated.
///
/// Unreadable subtrees, broken links and link cycles are skipped.
pub fn enumerate(
    root: &Path,
    rules: &ExclusionRules,
    filter: &ExtensionFilter,
    follow_links: bool,
) -> Result<Vec<FileCandidate>> {
    validate_root(root)?;
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(follow_links);
    let walk_rules = rules.clone();
    let walk_root = root.to_path_buf();
    builder.filter_entry(move |entry| keep_entry(&walk_root, &walk_rules, entry));

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(relative) = relative_posix(root, entry.path()) else {
            continue;
        };
        if relative.is_empty() || !filter.matches(entry.path()) {
            continue;
        }
        files.push(FileCandidate {
            relative,
            path: entry.into_path(),
        });
    }
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    files.dedup_by(|a, b| a.relative == b.relative);
    tracing::info!("Enumerated {} candidates under {}", files.len(), root.display());
    Ok(files)
}

fn keep_entry(root: &Path, rules: &ExclusionRules, entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let Some(relative) = relative_posix(root, entry.path()) else {
        return true;
    };
    let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
    let excluded = rules.is_excluded(&relative, is_dir);
    if excluded {
        tracing::debug!("Excluded {}", relative);
    }
    !excluded
}
