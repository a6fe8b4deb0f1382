//! # Bundlecat
//!
//! `bundlecat` walks a directory, drops binary files and excluded paths, and concatenates
//! the remaining text files into a single document, one `# file: <path>` block per file.
//!
//! Exclusion is two-tiered: a fixed list of structural directories (`.git`, `node_modules`,
//! `dist`, ...) that always applies, plus the root's `.gitignore` when present. An optional
//! [`ExtensionFilter`] narrows the result further. Files are emitted in sorted relative-path
//! order, so the same tree always produces the same bundle byte for byte.
//!
//! # Features
//!
//! - `parallel`: Classifies and decodes files on Rayon; output order is unchanged.
//! - `streaming`: Enables [`BundleStream`], an iterator over per-file outcomes.
//!
//! # Example
//!
//! ```no_run
//! use bundlecat::{BundleBuilder, ExtensionFilter, NoProgress, bundle};
//!
//! let options = BundleBuilder::new("./my-project")
//!     .destination("./my-project.txt")
//!     .extensions(ExtensionFilter::parse(".rs .toml"))
//!     .build();
//!
//! let report = bundle(&options, &mut NoProgress).expect("Failed to bundle directory");
//! println!("{}", report.summary());
//! ```

mod content;
mod engine;
mod error;
mod exclude;
pub mod output;
mod options;
mod types;
mod walk;

pub use content::{Decoded, TextRead, decode_latin1, decode_utf8, looks_binary, read_text, sniff};
#[cfg(feature = "streaming")]
pub use engine::BundleStream;
pub use engine::{NoProgress, Progress, bundle, bundle_to_string, candidates};
pub use error::{BundlecatError, Result};
pub use exclude::{DEFAULT_EXCLUDES, ExclusionRules, IGNORE_FILE_NAME};
pub use options::{
    BinaryDetection, BundleBuilder, BundleOptions, DEFAULT_BUNDLE_NAME, DEFAULT_SNIFF_WINDOW,
    ExtensionFilter, SNIFF_CEILING,
};
pub use types::{BundleEntry, BundleReport, FileCandidate, FileOutcome, SkipReason};
pub use walk::{enumerate, relative_posix, validate_root};
