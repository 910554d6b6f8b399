use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use glob::Pattern;

use crate::formatter::FormatterCommand;

pub const DEFAULT_ROOTS: [&str; 8] = [
    "example",
    "include",
    "sdk",
    "service",
    "storage",
    "txindex",
    "txplanner",
    "benchmark",
];
pub const DEFAULT_EXTENSIONS: [&str; 3] = [".h", ".cpp", ".cc"];
pub const DEFAULT_FORMATTER: &str = "clang-format";
pub const DEFAULT_FORMATTER_ARGS: [&str; 1] = ["-i"];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Working directory the roots are resolved against (default: current directory)
    #[arg(short = 'C', long)]
    pub dir: Option<PathBuf>,

    /// Root directories to format, in order (can be repeated or comma separated)
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    pub root: Vec<String>,

    /// File name suffixes to format, e.g. .h,.cpp (can be repeated or comma separated)
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    pub ext: Vec<String>,

    /// Formatter program, invoked once per file with the path as last argument
    #[arg(long, default_value = DEFAULT_FORMATTER)]
    pub formatter: String,

    /// Argument passed to the formatter before the path (can be repeated; default: -i).
    /// Prefer the `--formatter-arg=-i` form, since `-i` alone is also `--ignore`
    #[arg(long = "formatter-arg", allow_hyphen_values = true)]
    pub formatter_args: Vec<String>,

    /// Glob patterns to skip (can be repeated or comma separated)
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    pub ignore: Vec<String>,

    /// What to do when the formatter fails on a file
    #[arg(long, value_enum, default_value = "ignore")]
    pub on_failure: FailurePolicy,

    /// Only print the matching files; do not run the formatter
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How a failed formatter invocation affects the run.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Discard the failure and move on to the next file.
    #[default]
    Ignore,
    /// Log a warning and move on to the next file.
    Warn,
    /// Stop the run with an error.
    Fail,
}

#[derive(Debug)]
pub struct Options {
    pub working_directory: PathBuf,
    pub roots: Vec<String>,
    pub extensions: Vec<String>,
    pub formatter: FormatterCommand,
    pub ignore_patterns: Vec<Pattern>,
    pub failure_policy: FailurePolicy,
    pub dry_run: bool,
}

impl Options {
    /// Default roots, suffixes and formatter, resolved against `working_directory`.
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            roots: DEFAULT_ROOTS.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            formatter: FormatterCommand::default(),
            ignore_patterns: Vec::new(),
            failure_policy: FailurePolicy::Ignore,
            dry_run: false,
        }
    }
}

pub fn build_options(args: &Args) -> Result<Options> {
    let working_directory = match &args.dir {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("Invalid working directory: {}", dir.display()))?,
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    let mut opts = Options::new(working_directory);

    if !args.root.is_empty() {
        if args.root.iter().any(|r| r.trim().is_empty()) {
            bail!("Root directory names cannot be empty");
        }
        if let Some(abs) = args.root.iter().find(|r| Path::new(r.as_str()).is_absolute()) {
            bail!("Root directories must be relative to the working directory: {abs}");
        }
        opts.roots = args.root.clone();
    }

    if !args.ext.is_empty() {
        if args.ext.iter().any(|e| e.is_empty()) {
            bail!("File suffixes cannot be empty");
        }
        opts.extensions = args.ext.clone();
    }

    opts.formatter.program = args.formatter.clone();
    if !args.formatter_args.is_empty() {
        opts.formatter.args = args.formatter_args.clone();
    }

    opts.ignore_patterns = args
        .ignore
        .iter()
        .map(|s| Pattern::new(s).with_context(|| format!("Invalid glob pattern: {s}")))
        .collect::<Result<Vec<_>>>()?;

    opts.failure_policy = args.on_failure;
    opts.dry_run = args.dry_run;

    Ok(opts)
}
