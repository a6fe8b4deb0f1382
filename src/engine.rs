use crate::content::{self, TextRead};
use crate::error::{BundlecatError, Result};
use crate::exclude::ExclusionRules;
use crate::options::{BinaryDetection, BundleOptions};
use crate::output::{render_block, write_bundle};
use crate::types::{BundleEntry, BundleReport, FileCandidate, FileOutcome, SkipReason};
use crate::walk::{enumerate, validate_root};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Hook for a host that reports progress or wants to stop a run.
///
/// `checkpoint` runs after every candidate. Returning `Break` aborts the run
/// before anything is written. With the `parallel` feature every candidate is
/// read before the first checkpoint, so `Break` only stops assembly.
pub trait Progress {
    fn message(&mut self, _message: &str) {}
    fn checkpoint(&mut self, _considered: usize, _included: usize) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Progress sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

struct Plan {
    candidates: Vec<FileCandidate>,
    destination: PathBuf,
    window: usize,
    detection: BinaryDetection,
}

impl Plan {
    fn prepare(options: &BundleOptions, progress: &mut dyn Progress) -> Result<Self> {
        tracing::debug!("Starting bundle with root: {}", options.root.display());
        validate_root(&options.root)?;
        progress.message("Loading .gitignore (if present)...");
        let rules = ExclusionRules::load(&options.root, options.respect_gitignore)?;
        progress.message("Enumerating files...");
        let candidates = enumerate(
            &options.root,
            &rules,
            &options.extensions,
            options.follow_links,
        )?;
        progress.message(&format!("Found {} candidates", candidates.len()));
        Ok(Self {
            candidates,
            destination: resolve(&options.destination),
            window: options.effective_sniff_window(),
            detection: options.binary_detection,
        })
    }

    fn process(&self, candidate: &FileCandidate) -> FileOutcome {
        let skipped = |reason| FileOutcome::Skipped {
            relative: candidate.relative.clone(),
            reason,
        };
        if resolve(&candidate.path) == self.destination {
            return skipped(SkipReason::Destination);
        }
        match content::read_text(&candidate.path, self.window, self.detection) {
            TextRead::Text(content) => FileOutcome::Included(BundleEntry {
                relative: candidate.relative.clone(),
                content,
                latin1: false,
            }),
            TextRead::Latin1(content) => FileOutcome::Included(BundleEntry {
                relative: candidate.relative.clone(),
                content,
                latin1: true,
            }),
            TextRead::Binary => skipped(SkipReason::Binary),
            TextRead::Unreadable(e) => {
                tracing::debug!("Cannot read {}: {}", candidate.path.display(), e);
                skipped(SkipReason::Unreadable)
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn outcomes(&self) -> impl Iterator<Item = FileOutcome> + '_ {
        self.candidates.iter().map(|c| self.process(c))
    }

    #[cfg(feature = "parallel")]
    fn outcomes(&self) -> impl Iterator<Item = FileOutcome> + '_ {
        let outcomes: Vec<FileOutcome> =
            self.candidates.par_iter().map(|c| self.process(c)).collect();
        outcomes.into_iter()
    }
}

/// Canonical form of `path`, or of its parent joined with the file name when
/// the path itself does not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(canonical) = fs::canonicalize(parent) {
            return canonical.join(name);
        }
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn assemble(
    options: &BundleOptions,
    progress: &mut dyn Progress,
) -> Result<(String, BundleReport)> {
    let plan = Plan::prepare(options, progress)?;
    let mut report = BundleReport {
        destination: options.destination.clone(),
        considered: plan.candidates.len(),
        ..Default::default()
    };
    let mut buffer = String::new();
    for (index, outcome) in plan.outcomes().enumerate() {
        report.record(&outcome);
        match &outcome {
            FileOutcome::Included(entry) => {
                render_block(entry, &mut buffer);
                if options.progress_interval > 0 && report.included % options.progress_interval == 0 {
                    progress.message(&format!("Processed {} files...", report.included));
                }
            }
            FileOutcome::Skipped { relative, reason } => {
                tracing::debug!("Skipped {} ({:?})", relative, reason);
            }
        }
        if progress.checkpoint(index + 1, report.included).is_break() {
            return Err(BundlecatError::Cancelled {
                processed: index + 1,
            });
        }
    }
    Ok((buffer, report))
}

/// Builds the bundle in memory without touching the destination.
pub fn bundle_to_string(
    options: &BundleOptions,
    progress: &mut dyn Progress,
) -> Result<(String, BundleReport)> {
    assemble(options, progress)
}

/// Builds the bundle and writes it to `options.destination`.
pub fn bundle(options: &BundleOptions, progress: &mut dyn Progress) -> Result<BundleReport> {
    let (buffer, report) = assemble(options, progress)?;
    progress.message("Writing bundle...");
    write_bundle(&buffer, &options.destination)?;
    tracing::info!("{}", report.summary());
    Ok(report)
}

/// Sorted candidates for `options`, without reading any content.
///
/// The destination file is left out, as a run would skip it.
pub fn candidates(options: &BundleOptions) -> Result<Vec<FileCandidate>> {
    let plan = Plan::prepare(options, &mut NoProgress)?;
    let destination = plan.destination;
    Ok(plan
        .candidates
        .into_iter()
        .filter(|c| resolve(&c.path) != destination)
        .collect())
}

/// Yields one outcome per candidate, in sorted order.
#[cfg(feature = "streaming")]
pub struct BundleStream {
    plan: Plan,
    next: usize,
}

#[cfg(feature = "streaming")]
impl BundleStream {
    pub fn new(options: &BundleOptions) -> Result<Self> {
        Ok(Self {
            plan: Plan::prepare(options, &mut NoProgress)?,
            next: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.plan.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.candidates.is_empty()
    }
}

#[cfg(feature = "streaming")]
impl Iterator for BundleStream {
    type Item = FileOutcome;
    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.plan.candidates.get(self.next)?;
        self.next += 1;
        Some(self.plan.process(candidate))
    }
}
