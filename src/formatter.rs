use std::path::Path;
use std::process::Command;

use crate::cli::{DEFAULT_FORMATTER, DEFAULT_FORMATTER_ARGS};

/// Result of a single in-place formatting attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Formatted,
    /// The formatter ran but exited unsuccessfully (`None` when killed by a signal).
    Exited(Option<i32>),
    /// The formatter could not be started at all.
    SpawnFailed(String),
}

impl FormatOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FormatOutcome::Formatted)
    }

    pub fn describe(&self) -> String {
        match self {
            FormatOutcome::Formatted => "formatted".to_string(),
            FormatOutcome::Exited(Some(code)) => format!("formatter exited with status {code}"),
            FormatOutcome::Exited(None) => "formatter terminated by signal".to_string(),
            FormatOutcome::SpawnFailed(reason) => format!("formatter could not be started: {reason}"),
        }
    }
}

/// Rewrites a file to its canonical style, keeping its path.
pub trait Formatter {
    fn format_in_place(&self, path: &Path) -> FormatOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for FormatterCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_FORMATTER.to_string(),
            args: DEFAULT_FORMATTER_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Runs an external program with the target path as its last argument.
///
/// The child inherits stdin, stdout and stderr and is waited on before returning.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    command: FormatterCommand,
}

impl ExternalCommand {
    pub fn new(command: FormatterCommand) -> Self {
        Self { command }
    }
}

impl Formatter for ExternalCommand {
    fn format_in_place(&self, path: &Path) -> FormatOutcome {
        let status = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(path)
            .status();

        match status {
            Ok(s) if s.success() => FormatOutcome::Formatted,
            Ok(s) => FormatOutcome::Exited(s.code()),
            Err(e) => FormatOutcome::SpawnFailed(e.to_string()),
        }
    }
}
