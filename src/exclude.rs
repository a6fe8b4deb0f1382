//! Exclusion rules: a fixed structural policy plus the project's `.gitignore`.
//!
//! The two tiers are kept apart and evaluated independently. A broken or
//! half-valid `.gitignore` can only add vetoes, it never weakens the defaults.

use crate::error::{BundlecatError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::Path;

/// Directory names excluded anywhere in the tree, together with everything below them.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "dist",
    "build",
    ".terraform",
    ".idea",
    ".vscode",
];

pub const IGNORE_FILE_NAME: &str = ".gitignore";

#[derive(Debug, Clone)]
pub struct ExclusionRules {
    structural: GlobSet,
    project: Option<Gitignore>,
}

impl ExclusionRules {
    /// Structural defaults only.
    pub fn defaults() -> Result<Self> {
        Ok(Self {
            structural: structural_set()?,
            project: None,
        })
    }

    /// Defaults plus `<root>/.gitignore` when `respect_gitignore` is set and the file is readable.
    pub fn load(root: &Path, respect_gitignore: bool) -> Result<Self> {
        let mut rules = Self::defaults()?;
        if !respect_gitignore {
            return Ok(rules);
        }
        let ignore_path = root.join(IGNORE_FILE_NAME);
        match fs::read(&ignore_path) {
            Ok(bytes) => {
                tracing::debug!("Loaded {}", ignore_path.display());
                rules.project = build_project(root, &String::from_utf8_lossy(&bytes));
            }
            Err(e) => {
                tracing::debug!("No project ignore rules ({}): {}", ignore_path.display(), e);
            }
        }
        Ok(rules)
    }

    /// Defaults plus rules parsed from `text`, as if it were `<root>/.gitignore`.
    pub fn from_ignore_text(root: &Path, text: &str) -> Result<Self> {
        let mut rules = Self::defaults()?;
        rules.project = build_project(root, text);
        Ok(rules)
    }

    pub fn has_project_rules(&self) -> bool {
        self.project.is_some()
    }

    /// `relative` uses forward slashes and is relative to the root.
    pub fn is_structurally_excluded(&self, relative: &str) -> bool {
        !relative.is_empty() && self.structural.is_match(relative)
    }

    /// Whether the project ignore file vetoes `relative` or one of its parents.
    pub fn is_project_ignored(&self, relative: &str, is_dir: bool) -> bool {
        match &self.project {
            Some(gi) if !relative.is_empty() => gi
                .matched_path_or_any_parents(relative, is_dir)
                .is_ignore(),
            _ => false,
        }
    }

    pub fn is_excluded(&self, relative: &str, is_dir: bool) -> bool {
        self.is_structurally_excluded(relative) || self.is_project_ignored(relative, is_dir)
    }
}

fn structural_set() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for name in DEFAULT_EXCLUDES {
        for pattern in [format!("**/{}", name), format!("**/{}/**", name)] {
            let glob = Glob::new(&pattern).map_err(|e| {
                BundlecatError::Pattern(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }
    }
    builder
        .build()
        .map_err(|e| BundlecatError::Pattern(format!("Failed to build glob set: {}", e)))
}

fn build_project(root: &Path, text: &str) -> Option<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for line in text.lines() {
        if let Err(e) = builder.add_line(None, line) {
            tracing::warn!("Skipping ignore line {:?}: {}", line, e);
        }
    }
    match builder.build() {
        Ok(gi) if gi.is_empty() => None,
        Ok(gi) => Some(gi),
        Err(e) => {
            tracing::warn!("Ignoring project rules: {}", e);
            None
        }
    }
}
