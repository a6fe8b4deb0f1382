use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest prefix ever read when classifying a file, whatever window is requested.
pub const SNIFF_CEILING: usize = 4096;
/// Window requested when none is configured. Clamped to [`SNIFF_CEILING`].
pub const DEFAULT_SNIFF_WINDOW: usize = 8192;
/// File name used for the destination when only a root is given.
pub const DEFAULT_BUNDLE_NAME: &str = "bundle.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinaryDetection {
    /// Binary iff the sniff window holds a null byte.
    #[default]
    Simple,
    /// Null byte, `content_inspector` verdict, or a high share of control bytes.
    Accurate,
}

/// Lower-cased, dot-prefixed extensions a file must carry to be bundled.
///
/// An empty filter lets every file through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Parses a space separated list such as `".tf .py"`.
    pub fn parse(input: &str) -> Self {
        Self::from_list(input.split_whitespace())
    }

    pub fn from_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();
        Self { extensions }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let Some(ext) = path.extension() else {
            return false;
        };
        let dotted = format!(".{}", ext.to_string_lossy().to_lowercase());
        self.extensions.iter().any(|e| *e == dotted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleOptions {
    pub root: PathBuf,
    pub destination: PathBuf,
    pub extensions: ExtensionFilter,
    pub respect_gitignore: bool,
    pub follow_links: bool,
    pub binary_detection: BinaryDetection,
    pub sniff_window: usize,
    pub progress_interval: usize,
}

impl Default for BundleOptions {
    fn default() -> Self {
        let root = PathBuf::from(".");
        Self {
            destination: root.join(DEFAULT_BUNDLE_NAME),
            root,
            extensions: ExtensionFilter::default(),
            respect_gitignore: true,
            follow_links: true,
            binary_detection: BinaryDetection::Simple,
            sniff_window: DEFAULT_SNIFF_WINDOW,
            progress_interval: 50,
        }
    }
}

impl BundleOptions {
    /// Bytes actually probed per file.
    pub fn effective_sniff_window(&self) -> usize {
        match self.sniff_window {
            0 => SNIFF_CEILING,
            n => n.min(SNIFF_CEILING),
        }
    }
}

#[derive(Debug, Default)]
pub struct BundleBuilder {
    options: BundleOptions,
}

impl BundleBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            options: BundleOptions {
                destination: root.join(DEFAULT_BUNDLE_NAME),
                root,
                ..Default::default()
            },
        }
    }
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.destination = path.into();
        self
    }
    pub fn extensions(mut self, filter: ExtensionFilter) -> Self {
        self.options.extensions = filter;
        self
    }
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.options.respect_gitignore = yes;
        self
    }
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.options.follow_links = yes;
        self
    }
    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.options.binary_detection = method;
        self
    }
    pub fn sniff_window(mut self, bytes: usize) -> Self {
        self.options.sniff_window = bytes;
        self
    }
    pub fn progress_interval(mut self, every: usize) -> Self {
        self.options.progress_interval = every;
        self
    }
    pub fn build(self) -> BundleOptions {
        self.options
    }
}
