use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::cli::{FailurePolicy, Options};
use crate::formatter::Formatter;
use crate::scanner::{scan_root, FormatTarget};
use crate::utils::{file_digest, resolve_root};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Counters {
    pub matched: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub missing_roots: usize,
    pub walk_errors: usize,
}

/// Walks the configured roots in order and formats every matching file, one at a time.
pub struct Runner<F> {
    opts: Options,
    formatter: F,
}

impl<F: Formatter> Runner<F> {
    pub fn new(opts: Options, formatter: F) -> Self {
        Self { opts, formatter }
    }

    pub fn formatter(&self) -> &F {
        &self.formatter
    }

    /// Writes each matched path to `out` (flushed) before the formatter touches it.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<Counters> {
        let mut counters = Counters::default();

        for root_name in &self.opts.roots {
            let root = resolve_root(&self.opts.working_directory, root_name);
            let mut scan = scan_root(&root, &self.opts.extensions, &self.opts.ignore_patterns);
            if scan.root_missing() {
                counters.missing_roots += 1;
                continue;
            }
            info!(root = %scan.root().display(), "scanning");

            for target in scan.by_ref() {
                counters.matched += 1;
                writeln!(out, "{}", target.path.display()).context("Failed to write to stdout")?;
                out.flush().context("Failed to write to stdout")?;

                if self.opts.dry_run {
                    continue;
                }
                self.format_target(&target, &mut counters)?;
            }

            counters.walk_errors += scan.walk_errors();
        }

        Ok(counters)
    }

    fn format_target(&self, target: &FormatTarget, counters: &mut Counters) -> Result<()> {
        let path = &target.path;
        let before = file_digest(path);
        let outcome = self.formatter.format_in_place(path);

        if outcome.is_success() {
            match (before, file_digest(path)) {
                (Some(a), Some(b)) if a == b => {
                    counters.unchanged += 1;
                    debug!(path = %path.display(), "already formatted");
                }
                _ => {
                    counters.changed += 1;
                    debug!(path = %path.display(), "reformatted");
                }
            }
            return Ok(());
        }

        counters.failed += 1;
        match self.opts.failure_policy {
            FailurePolicy::Ignore => {
                debug!(path = %path.display(), reason = %outcome.describe(), "formatter failed");
            }
            FailurePolicy::Warn => {
                warn!(path = %path.display(), reason = %outcome.describe(), "formatter failed");
            }
            FailurePolicy::Fail => {
                bail!("Formatting {} failed: {}", path.display(), outcome.describe());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::formatter::FormatOutcome;

    struct Scripted {
        calls: RefCell<Vec<PathBuf>>,
        outcome: FormatOutcome,
    }

    impl Scripted {
        fn new(outcome: FormatOutcome) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                outcome,
            }
        }
    }

    impl Formatter for Scripted {
        fn format_in_place(&self, path: &Path) -> FormatOutcome {
            self.calls.borrow_mut().push(path.to_path_buf());
            self.outcome.clone()
        }
    }

    fn tree() -> (tempfile::TempDir, Options) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("include/a.h"), "int a;\n").unwrap();
        fs::write(dir.path().join("include/b.h"), "int b;\n").unwrap();
        let mut opts = Options::new(dir.path());
        opts.roots = vec!["include".into()];
        (dir, opts)
    }

    #[test]
    fn ignore_policy_keeps_going() {
        let (_dir, opts) = tree();
        let runner = Runner::new(opts, Scripted::new(FormatOutcome::Exited(Some(1))));
        let mut out = Vec::new();

        let counters = runner.run(&mut out).unwrap();

        assert_eq!(counters.matched, 2);
        assert_eq!(counters.failed, 2);
        assert_eq!(runner.formatter().calls.borrow().len(), 2);
    }

    #[test]
    fn warn_policy_keeps_going() {
        let (_dir, mut opts) = tree();
        opts.failure_policy = FailurePolicy::Warn;
        let runner = Runner::new(opts, Scripted::new(FormatOutcome::SpawnFailed("nope".into())));

        let counters = runner.run(&mut Vec::new()).unwrap();

        assert_eq!(counters.failed, 2);
    }

    #[test]
    fn fail_policy_stops_at_first_failure() {
        let (dir, mut opts) = tree();
        opts.failure_policy = FailurePolicy::Fail;
        let runner = Runner::new(opts, Scripted::new(FormatOutcome::Exited(Some(3))));
        let mut out = Vec::new();

        let err = runner.run(&mut out).unwrap_err();

        assert!(err.to_string().contains("status 3"));
        assert_eq!(runner.formatter().calls.borrow().len(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            format!("{}\n", dir.path().join("include/a.h").display())
        );
    }

    #[test]
    fn untouched_files_count_as_unchanged() {
        let (_dir, opts) = tree();
        let runner = Runner::new(opts, Scripted::new(FormatOutcome::Formatted));

        let counters = runner.run(&mut Vec::new()).unwrap();

        assert_eq!(counters.unchanged, 2);
        assert_eq!(counters.changed, 0);
    }

    /// Removes the file it is asked to format.
    struct Deleting;

    impl Formatter for Deleting {
        fn format_in_place(&self, path: &Path) -> FormatOutcome {
            match fs::remove_file(path) {
                Ok(()) => FormatOutcome::Formatted,
                Err(e) => FormatOutcome::SpawnFailed(e.to_string()),
            }
        }
    }

    #[test]
    fn unreadable_result_counts_as_changed() {
        let (dir, opts) = tree();
        let runner = Runner::new(opts, Deleting);

        let counters = runner.run(&mut Vec::new()).unwrap();

        assert_eq!(counters.changed, 2);
        assert_eq!(counters.unchanged, 0);
        assert_eq!(counters.failed, 0);
        assert!(!dir.path().join("include/a.h").exists());
    }

    #[test]
    fn walk_errors_are_summed_into_counters() {
        let (dir, opts) = tree();
        fs::create_dir_all(dir.path().join("include/sub")).unwrap();
        fs::write(dir.path().join("include/sub/c.h"), "").unwrap();
        let sub = dir.path().join("include/sub");
        // Drops the subdirectory while the parent's files are being formatted.
        let runner = Runner::new(opts, RemoveDir(sub));

        let counters = runner.run(&mut Vec::new()).unwrap();

        assert_eq!(counters.matched, 2);
        assert_eq!(counters.walk_errors, 1);
    }

    struct RemoveDir(PathBuf);

    impl Formatter for RemoveDir {
        fn format_in_place(&self, _path: &Path) -> FormatOutcome {
            let _ = fs::remove_dir_all(&self.0);
            FormatOutcome::Formatted
        }
    }

    #[test]
    fn missing_roots_are_counted_not_raised() {
        let (_dir, mut opts) = tree();
        opts.roots = vec!["include".into(), "benchmark".into(), "sdk".into()];
        let runner = Runner::new(opts, Scripted::new(FormatOutcome::Formatted));

        let counters = runner.run(&mut Vec::new()).unwrap();

        assert_eq!(counters.missing_roots, 2);
        assert_eq!(counters.matched, 2);
    }
}
