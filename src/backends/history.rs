//! Version-control history probe
//!
//! Auto-TODO only annotates a dead link when no file with the same base
//! name ever appeared in history; a hit suggests the file was moved. Names
//! are matched as whole path components, never as suffixes.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Outcome of a history lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLookup {
    /// Some commit touched a file with this base name
    Found,
    /// History is available and has no such file
    NotFound,
    /// No usable history (git missing, not a repository, ...)
    Unavailable,
}

/// Source of file history
pub trait HistoryProbe: Sync {
    fn lookup(&self, base_name: &str) -> HistoryLookup;
}

/// Pathspec matching files named exactly `base_name` in any directory.
/// Glob metacharacters in the name are escaped so they match literally.
pub fn base_name_pathspec(base_name: &str) -> String {
    let mut escaped = String::with_capacity(base_name.len() + 8);
    for c in base_name.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!(":(glob)**/{}", escaped)
}

/// Probe backed by `git log` in a working tree
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo: PathBuf,
}

impl GitHistory {
    pub fn new(repo: &Path) -> Self {
        Self {
            repo: repo.to_path_buf(),
        }
    }
}

impl HistoryProbe for GitHistory {
    fn lookup(&self, base_name: &str) -> HistoryLookup {
        let output = Command::new("git")
            .current_dir(&self.repo)
            .arg("log")
            .arg("--all")
            .arg("--format=%H")
            .arg("-1")
            .arg("--")
            .arg(base_name_pathspec(base_name))
            .output();

        let output = match output {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                debug!(
                    "git log failed in {}: {}",
                    self.repo.display(),
                    String::from_utf8_lossy(&o.stderr).trim()
                );
                return HistoryLookup::Unavailable;
            }
            Err(e) => {
                debug!("git not available: {}", e);
                return HistoryLookup::Unavailable;
            }
        };

        if String::from_utf8_lossy(&output.stdout).trim().is_empty() {
            HistoryLookup::NotFound
        } else {
            HistoryLookup::Found
        }
    }
}

/// Probe that never has history; auto-TODO through it always falls through
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryProbe for NoHistory {
    fn lookup(&self, _base_name: &str) -> HistoryLookup {
        HistoryLookup::Unavailable
    }
}
