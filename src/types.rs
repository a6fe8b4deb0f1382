use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file that survived exclusion and extension filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// Path relative to the root, always with `/` separators.
    pub relative: String,
    /// Path used to open the file.
    pub path: PathBuf,
}

/// One rendered block of the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub relative: String,
    pub content: String,
    /// Set when the file was not valid UTF-8 and was read byte-per-char.
    pub latin1: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The candidate is the bundle being written.
    Destination,
    /// Null byte (or other binary evidence) in the sniff window, or the probe failed.
    Binary,
    /// Passed the sniff but could not be read in full.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOutcome {
    Included(BundleEntry),
    Skipped { relative: String, reason: SkipReason },
}

/// Counts reported once a bundle is produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleReport {
    pub destination: PathBuf,
    pub considered: usize,
    pub included: usize,
    pub skipped_binary: usize,
    pub skipped_unreadable: usize,
    pub skipped_destination: usize,
    pub latin1_fallbacks: usize,
}

impl BundleReport {
    pub(crate) fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Included(entry) => {
                self.included += 1;
                if entry.latin1 {
                    self.latin1_fallbacks += 1;
                }
            }
            FileOutcome::Skipped { reason, .. } => match reason {
                SkipReason::Destination => self.skipped_destination += 1,
                SkipReason::Binary => self.skipped_binary += 1,
                SkipReason::Unreadable => self.skipped_unreadable += 1,
            },
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Bundle written: {} (considered {} files, included {})",
            self.destination.display(),
            self.considered,
            self.included
        )
    }
}
