//
// lib.rs
// srcfmt
//
// Library entry: re-exports option parsing, scanning, and the format runner for the binary and tests.
//
pub mod cli;
pub mod formatter;
pub mod runner;
pub mod scanner;
pub mod utils;

pub use cli::{build_options, Args, FailurePolicy, Options};
pub use formatter::{ExternalCommand, FormatOutcome, Formatter, FormatterCommand};
pub use runner::{Counters, Runner};
pub use scanner::{scan_root, FormatTarget, Scan};
