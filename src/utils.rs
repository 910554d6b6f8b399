use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use sha2::{Digest, Sha256};

/// Plain, case-sensitive suffix test on the file name.
pub fn has_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

pub fn is_ignored(rel: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let name = rel.file_name().and_then(|s| s.to_str()).unwrap_or("");
    let s_rel = rel.to_string_lossy().replace('\\', "/");
    patterns
        .iter()
        .any(|pat| pat.matches(&s_rel) || pat.matches(name))
}

pub fn resolve_root(working_directory: &Path, root: &str) -> PathBuf {
    working_directory.join(root)
}

pub fn file_digest(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).ok()?;
    Some(hex::encode(hasher.finalize()))
}
