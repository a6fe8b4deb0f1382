//! Command-line interface for bundlecat.
//!
//! Bundles a directory into one text file, or lists what would be bundled.

use bundlecat::{
    BinaryDetection, BundleBuilder, BundleOptions, BundleReport, ExtensionFilter, NoProgress,
    Progress, bundle, bundle_to_string, candidates,
};
use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// bundlecat — concatenate a source tree into one context file
#[derive(Parser)]
#[command(name = "bundlecat", version, about, long_about = None)]
struct Cli {
    /// Root directory (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Destination file (default <ROOT>/bundle.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only include these extensions, space separated (e.g. ".tf .py"); can be repeated
    #[arg(short, long = "ext")]
    extensions: Vec<String>,

    /// Binary detection strategy
    #[arg(long, value_enum, default_value_t = Detection::Simple)]
    binary_detection: Detection,

    /// Disable .gitignore handling
    #[arg(long)]
    no_gitignore: bool,

    /// Do not follow symbolic links
    #[arg(long)]
    no_follow_links: bool,

    /// Print the sorted candidate paths (without the destination) and exit
    #[arg(long, conflicts_with = "stdout")]
    list: bool,

    /// Print the bundle to stdout instead of writing it
    #[arg(long)]
    stdout: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Hide the progress spinner
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Detection {
    Simple,
    Accurate,
}

impl From<Detection> for BinaryDetection {
    fn from(value: Detection) -> Self {
        match value {
            Detection::Simple => BinaryDetection::Simple,
            Detection::Accurate => BinaryDetection::Accurate,
        }
    }
}

impl Cli {
    fn to_options(&self) -> BundleOptions {
        let mut builder = BundleBuilder::new(&self.root)
            .extensions(ExtensionFilter::parse(&self.extensions.join(" ")))
            .respect_gitignore(!self.no_gitignore)
            .follow_links(!self.no_follow_links)
            .binary_detection(self.binary_detection.into());
        if let Some(output) = &self.output {
            builder = builder.destination(output);
        }
        builder.build()
    }
}

struct Spinner(ProgressBar);

impl Spinner {
    fn new(quiet: bool) -> Self {
        if quiet {
            return Self(ProgressBar::hidden());
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self(bar)
    }
}

impl Progress for Spinner {
    fn message(&mut self, message: &str) {
        self.0.set_message(message.to_string());
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let options = cli.to_options();

    if cli.list {
        run_list(&options);
        return;
    }
    if cli.stdout {
        run_stdout(&options, cli.json);
        return;
    }

    let mut spinner = Spinner::new(cli.quiet || cli.json);
    let result = bundle(&options, &mut spinner);
    spinner.0.finish_and_clear();
    match result {
        Ok(report) => print_report(&report, cli.json),
        Err(e) => fail(e),
    }
}

fn run_list(options: &BundleOptions) {
    match candidates(options) {
        Ok(files) => {
            for file in files {
                println!("{}", file.relative);
            }
        }
        Err(e) => fail(e),
    }
}

fn run_stdout(options: &BundleOptions, json: bool) {
    match bundle_to_string(options, &mut NoProgress) {
        Ok((buffer, report)) => {
            print!("{}", buffer);
            if json {
                match serde_json::to_string(&report) {
                    Ok(out) => eprintln!("{}", out),
                    Err(e) => fail(e),
                }
            }
        }
        Err(e) => fail(e),
    }
}

fn print_report(report: &BundleReport, json: bool) {
    if !json {
        println!("{}", report.summary());
        return;
    }
    match serde_json::to_string_pretty(report) {
        Ok(out) => println!("{}", out),
        Err(e) => fail(e),
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    exit(1);
}
