use bundlecat::{
    BundleBuilder, BundlecatError, ExtensionFilter, NoProgress, Progress, bundle,
    bundle_to_string, candidates,
};
use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn sample_tree(root: &Path) {
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/lib")).unwrap();
    fs::create_dir_all(root.join("secrets")).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::write(root.join("src/main.py"), "print('hi')\n").unwrap();
    fs::write(root.join("image.png"), [0x89, b'P', b'N', b'G', 0, 0, 1]).unwrap();
    fs::write(root.join("node_modules/lib/index.js"), "module.exports = 1;").unwrap();
    fs::write(root.join("secrets/key.txt"), "hunter2").unwrap();
    fs::write(root.join(".gitignore"), "secrets/\n").unwrap();
}

#[test]
fn integration_full_flow() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("project");
    sample_tree(&root);
    let dest = dir.path().join("out/nested/bundle.txt");
    let options = BundleBuilder::new(&root).destination(&dest).build();

    let report = bundle(&options, &mut NoProgress).unwrap();
    let written = fs::read_to_string(&dest).unwrap();
    assert_eq!(
        written,
        "# file: .gitignore\nsecrets/\n\n\
         # file: a.txt\nhello\n\n\
         # file: src/main.py\nprint('hi')\n\n"
    );
    assert_eq!(report.considered, 4);
    assert_eq!(report.included, 3);
    assert_eq!(report.skipped_binary, 1);
    assert_eq!(
        report.summary(),
        format!(
            "Bundle written: {} (considered 4 files, included 3)",
            dest.display()
        )
    );
}

#[test]
fn integration_single_file_block() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();
    let options = BundleBuilder::new(&root)
        .destination(dir.path().join("bundle.txt"))
        .build();
    let (buffer, _) = bundle_to_string(&options, &mut NoProgress).unwrap();
    assert_eq!(buffer, "# file: a.txt\nhello\n\n");
}

#[test]
fn integration_idempotent_with_destination_inside_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    sample_tree(root);
    let options = BundleBuilder::new(root).build();

    let first = bundle(&options, &mut NoProgress).unwrap();
    let first_bytes = fs::read(root.join("bundle.txt")).unwrap();
    let second = bundle(&options, &mut NoProgress).unwrap();
    let second_bytes = fs::read(root.join("bundle.txt")).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert!(!String::from_utf8(second_bytes).unwrap().contains("# file: bundle.txt"));
    assert_eq!(first.skipped_destination, 0);
    assert_eq!(second.skipped_destination, 1);
    assert_eq!(second.considered, first.considered + 1);
    assert_eq!(second.included, first.included);
}

#[test]
fn integration_extension_filter() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(root.join("node_modules")).unwrap();
    fs::write(root.join("a.py"), "a").unwrap();
    fs::write(root.join("b.txt"), "b").unwrap();
    fs::write(root.join("c.PY"), "c").unwrap();
    fs::write(root.join("node_modules/x.py"), "x").unwrap();
    let options = BundleBuilder::new(&root)
        .extensions(ExtensionFilter::parse(".py"))
        .build();
    let found: Vec<String> = candidates(&options)
        .unwrap()
        .into_iter()
        .map(|c| c.relative)
        .collect();
    assert_eq!(found, vec!["a.py", "c.PY"]);
}

#[test]
fn integration_gitignore_negation_and_toggle() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(".gitignore"), "*.log\n!keep.log\n").unwrap();
    fs::write(root.join("drop.log"), "d").unwrap();
    fs::write(root.join("keep.log"), "k").unwrap();

    let options = BundleBuilder::new(root).build();
    let found: Vec<String> = candidates(&options)
        .unwrap()
        .into_iter()
        .map(|c| c.relative)
        .collect();
    assert_eq!(found, vec![".gitignore", "keep.log"]);

    let options = BundleBuilder::new(root).respect_gitignore(false).build();
    assert_eq!(candidates(&options).unwrap().len(), 3);
}

#[test]
fn integration_latin1_fallback() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("legacy.txt"), b"caf\xe9\n").unwrap();
    let dest = dir.path().join("bundle.txt");
    let options = BundleBuilder::new(&root).destination(&dest).build();

    let report = bundle(&options, &mut NoProgress).unwrap();
    assert_eq!(report.latin1_fallbacks, 1);
    assert_eq!(
        fs::read_to_string(&dest).unwrap(),
        "# file: legacy.txt\ncafé\n\n"
    );
}

#[test]
fn integration_empty_file_is_text() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("empty.txt"), "").unwrap();
    let options = BundleBuilder::new(&root)
        .destination(dir.path().join("bundle.txt"))
        .build();
    let (buffer, report) = bundle_to_string(&options, &mut NoProgress).unwrap();
    assert_eq!(report.included, 1);
    assert_eq!(buffer, "# file: empty.txt\n\n\n");
}

#[test]
fn integration_root_errors() {
    let dir = tempdir().unwrap();
    let missing = BundleBuilder::new(dir.path().join("missing")).build();
    assert!(matches!(
        bundle(&missing, &mut NoProgress),
        Err(BundlecatError::RootNotFound(_))
    ));

    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();
    let not_dir = BundleBuilder::new(&file)
        .destination(dir.path().join("bundle.txt"))
        .build();
    assert!(matches!(
        bundle(&not_dir, &mut NoProgress),
        Err(BundlecatError::NotADirectory(_))
    ));
}

struct StopAfter {
    limit: usize,
    messages: Vec<String>,
}

impl Progress for StopAfter {
    fn message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
    fn checkpoint(&mut self, considered: usize, _included: usize) -> ControlFlow<()> {
        if considered >= self.limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

#[test]
fn integration_cancellation_writes_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    for i in 0..5 {
        fs::write(root.join(format!("f{}.txt", i)), "x").unwrap();
    }
    let dest = dir.path().join("bundle.txt");
    let options = BundleBuilder::new(&root).destination(&dest).build();
    let mut progress = StopAfter {
        limit: 2,
        messages: Vec::new(),
    };

    let err = bundle(&options, &mut progress).unwrap_err();
    assert!(matches!(err, BundlecatError::Cancelled { processed: 2 }));
    assert!(!dest.exists());
    assert_eq!(
        progress.messages,
        vec![
            "Loading .gitignore (if present)...",
            "Enumerating files...",
            "Found 5 candidates",
        ]
    );
}

#[test]
fn integration_progress_messages() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    for i in 0..4 {
        fs::write(root.join(format!("f{}.txt", i)), "x").unwrap();
    }
    let options = BundleBuilder::new(&root)
        .destination(dir.path().join("bundle.txt"))
        .progress_interval(2)
        .build();
    let mut progress = StopAfter {
        limit: usize::MAX,
        messages: Vec::new(),
    };
    bundle(&options, &mut progress).unwrap();
    assert_eq!(
        progress.messages,
        vec![
            "Loading .gitignore (if present)...",
            "Enumerating files...",
            "Found 4 candidates",
            "Processed 2 files...",
            "Processed 4 files...",
            "Writing bundle...",
        ]
    );
}

fn null_at(offset: usize) -> Vec<u8> {
    let mut bytes = vec![b'a'; offset];
    bytes.push(0);
    bytes.extend_from_slice(b"tail\n");
    bytes
}

#[test]
fn integration_sniff_ceiling_holds_for_any_window() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("early.txt"), null_at(4095)).unwrap();
    fs::write(root.join("late.txt"), null_at(4096)).unwrap();

    for window in [0, 8192] {
        let options = BundleBuilder::new(&root)
            .destination(dir.path().join("bundle.txt"))
            .sniff_window(window)
            .build();
        assert_eq!(options.effective_sniff_window(), 4096);
        let (buffer, report) = bundle_to_string(&options, &mut NoProgress).unwrap();
        assert_eq!(report.considered, 2);
        assert_eq!(report.included, 1);
        assert_eq!(report.skipped_binary, 1);
        assert!(buffer.starts_with("# file: late.txt\n"));
        assert!(!buffer.contains("# file: early.txt"));
    }
}

#[test]
fn integration_smaller_window_misses_late_null() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("early.txt"), null_at(4095)).unwrap();
    let options = BundleBuilder::new(&root)
        .destination(dir.path().join("bundle.txt"))
        .sniff_window(100)
        .build();
    let (_, report) = bundle_to_string(&options, &mut NoProgress).unwrap();
    assert_eq!(report.included, 1);
    assert_eq!(report.skipped_binary, 0);
}

struct RemoveAfterEnumeration {
    victim: PathBuf,
}

impl Progress for RemoveAfterEnumeration {
    fn message(&mut self, message: &str) {
        if message.starts_with("Found ") {
            fs::remove_file(&self.victim).unwrap();
        }
    }
}

#[test]
fn integration_vanished_candidate_is_skipped() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("gone.txt"), "soon gone").unwrap();
    fs::write(root.join("z.txt"), "z").unwrap();
    let dest = dir.path().join("bundle.txt");
    let options = BundleBuilder::new(&root).destination(&dest).build();
    let mut progress = RemoveAfterEnumeration {
        victim: root.join("gone.txt"),
    };

    let report = bundle(&options, &mut progress).unwrap();
    assert_eq!(report.considered, 3);
    assert_eq!(report.included, 2);
    assert!(report.included < report.considered);
    assert_eq!(
        fs::read_to_string(&dest).unwrap(),
        "# file: a.txt\na\n\n# file: z.txt\nz\n\n"
    );
}

#[test]
fn integration_root_below_a_file_is_io_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();
    let options = BundleBuilder::new(file.join("sub"))
        .destination(dir.path().join("bundle.txt"))
        .build();
    assert!(matches!(
        bundle(&options, &mut NoProgress),
        Err(BundlecatError::Io { .. })
    ));
}

#[test]
fn integration_candidates_leave_out_destination() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("bundle.txt"), "# file: a.txt\na\n\n").unwrap();
    let options = BundleBuilder::new(root).build();
    let found: Vec<String> = candidates(&options)
        .unwrap()
        .into_iter()
        .map(|c| c.relative)
        .collect();
    assert_eq!(found, vec!["a.txt"]);
}

#[cfg(unix)]
#[test]
fn integration_follows_symlinks() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    let outside = dir.path().join("outside");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("shared.txt"), "shared").unwrap();
    std::os::unix::fs::symlink(&outside, root.join("linked")).unwrap();

    let options = BundleBuilder::new(&root).build();
    let found: Vec<String> = candidates(&options)
        .unwrap()
        .into_iter()
        .map(|c| c.relative)
        .collect();
    assert_eq!(found, vec!["linked/shared.txt"]);

    let options = BundleBuilder::new(&root).follow_links(false).build();
    assert!(candidates(&options).unwrap().is_empty());
}

#[cfg(feature = "streaming")]
#[test]
fn integration_stream_matches_order() {
    use bundlecat::{BundleStream, FileOutcome};
    let dir = tempdir().unwrap();
    let root = dir.path();
    sample_tree(root);
    let stream = BundleStream::new(&BundleBuilder::new(root).build()).unwrap();
    let included: Vec<String> = stream
        .filter_map(|o| match o {
            FileOutcome::Included(e) => Some(e.relative),
            FileOutcome::Skipped { .. } => None,
        })
        .collect();
    assert_eq!(included, vec![".gitignore", "a.txt", "src/main.py"]);
}
