use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::utils::{has_suffix, is_ignored};

/// A file selected for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTarget {
    pub path: PathBuf,
}

/// Lazy walk over one root, yielding files whose name carries a recognized suffix.
///
/// Order is depth-first and top-down: within a directory the files come first,
/// then the subdirectories, each sorted by name. Symlinked directories are not
/// entered; every other non-directory entry is a candidate. Unreadable entries
/// are skipped and counted.
pub struct Scan<'a> {
    root: PathBuf,
    walker: Option<walkdir::IntoIter>,
    extensions: &'a [String],
    ignore_patterns: &'a [Pattern],
    walk_errors: usize,
}

impl Scan<'_> {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when the root did not exist as a directory; the scan is then empty.
    pub fn root_missing(&self) -> bool {
        self.walker.is_none()
    }

    pub fn walk_errors(&self) -> usize {
        self.walk_errors
    }
}

pub fn scan_root<'a>(
    root: &Path,
    extensions: &'a [String],
    ignore_patterns: &'a [Pattern],
) -> Scan<'a> {
    let walker = if root.is_dir() {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter();
        Some(walker)
    } else {
        debug!(root = %root.display(), "root directory not found, nothing to format");
        None
    };

    Scan {
        root: root.to_path_buf(),
        walker,
        extensions,
        ignore_patterns,
        walk_errors: 0,
    }
}

impl Iterator for Scan<'_> {
    type Item = FormatTarget;

    fn next(&mut self) -> Option<FormatTarget> {
        let walker = self.walker.as_mut()?;

        loop {
            let entry = match walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
                    warn!(path = %path, error = %err, "skipping unreadable entry");
                    self.walk_errors += 1;
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            if is_ignored(rel, self.ignore_patterns) {
                debug!(path = %path.display(), "ignored");
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            // Anything that is not a directory, dangling symlinks included; the
            // formatter reports those itself.
            if entry.file_type().is_dir() || path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if has_suffix(&name, self.extensions) {
                return Some(FormatTarget {
                    path: path.to_path_buf(),
                });
            }
        }
    }
}
