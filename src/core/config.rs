//! Run configuration
//!
//! Built once from command-line flags and shared read-only by every worker.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default `../` count above which a link is reported as a deep path
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Setup problems that abort the run before any scanning happens
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("docs root does not exist or is not a directory: {0}")]
    DocsRootMissing(PathBuf),

    #[error("area root does not exist: {0}")]
    AreaRootMissing(PathBuf),

    #[error("invalid fix pattern '{0}': expected OLD:NEW with a non-empty OLD")]
    InvalidFixPattern(String),

    #[error("invalid exclude pattern: {0}")]
    InvalidExclude(#[from] regex::Error),

    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

/// Literal `OLD:NEW` substitution applied to matching links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixPattern {
    pub old: String,
    pub new: String,
}

impl FixPattern {
    /// Whether a raw link is subject to this fix
    pub fn matches(&self, raw_link: &str) -> bool {
        raw_link.contains(&self.old)
    }

    /// The rewritten link
    pub fn apply(&self, raw_link: &str) -> String {
        raw_link.replace(&self.old, &self.new)
    }
}

impl FromStr for FixPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((old, new)) if !old.is_empty() => Ok(FixPattern {
                old: old.to_string(),
                new: new.to_string(),
            }),
            _ => Err(ConfigError::InvalidFixPattern(s.to_string())),
        }
    }
}

/// Everything the orchestrator and validator need for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root that `/`-prefixed links resolve against (canonical)
    pub docs_root: PathBuf,

    /// Prefix that classifies resolved targets as internal (canonical)
    pub area_root: PathBuf,

    /// Print valid links as well
    pub verbose: bool,

    /// Number of concurrent workers (1 = sequential)
    pub workers: usize,

    pub fix: Option<FixPattern>,

    pub auto_todo: bool,

    pub warn_deep: bool,

    pub max_depth: usize,
}

impl RunConfig {
    /// Create a config with both roots canonicalized and validated
    pub fn new(docs_root: &Path, area_root: Option<&Path>) -> Result<Self, ConfigError> {
        let docs_root = docs_root
            .canonicalize()
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| ConfigError::DocsRootMissing(docs_root.to_path_buf()))?;

        let area_root = match area_root {
            Some(area) => area
                .canonicalize()
                .map_err(|_| ConfigError::AreaRootMissing(area.to_path_buf()))?,
            None => docs_root.clone(),
        };

        Ok(Self {
            docs_root,
            area_root,
            verbose: false,
            workers: 1,
            fix: None,
            auto_todo: false,
            warn_deep: false,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        self.workers = workers;
        Ok(self)
    }

    pub fn with_fix(mut self, fix: Option<FixPattern>) -> Self {
        self.fix = fix;
        self
    }

    pub fn with_auto_todo(mut self, auto_todo: bool) -> Self {
        self.auto_todo = auto_todo;
        self
    }

    pub fn with_deep_paths(mut self, warn_deep: bool, max_depth: usize) -> Self {
        self.warn_deep = warn_deep;
        self.max_depth = max_depth;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_fix_pattern() {
        let fix: FixPattern = "old/path/:new/path/".parse().unwrap();
        assert_eq!(fix.old, "old/path/");
        assert_eq!(fix.new, "new/path/");
        assert!(fix.matches("../old/path/FILE.md"));
        assert_eq!(fix.apply("../old/path/FILE.md"), "../new/path/FILE.md");
    }

    #[test]
    fn test_fix_pattern_allows_empty_new() {
        let fix: FixPattern = "legacy/:".parse().unwrap();
        assert_eq!(fix.apply("legacy/a.md"), "a.md");
    }

    #[test]
    fn test_fix_pattern_rejects_malformed() {
        assert!("no-separator".parse::<FixPattern>().is_err());
        assert!(":new".parse::<FixPattern>().is_err());
    }

    #[test]
    fn test_config_missing_docs_root() {
        let temp = tempdir().unwrap();
        let err = RunConfig::new(&temp.path().join("nope"), None).unwrap_err();
        assert!(matches!(err, ConfigError::DocsRootMissing(_)));
    }

    #[test]
    fn test_config_area_root_defaults_to_docs_root() {
        let temp = tempdir().unwrap();
        let config = RunConfig::new(temp.path(), None).unwrap();
        assert_eq!(config.area_root, config.docs_root);
        assert_eq!(config.workers, 1);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_config_rejects_zero_workers() {
        let temp = tempdir().unwrap();
        let config = RunConfig::new(temp.path(), None).unwrap();
        assert!(matches!(
            config.with_workers(0),
            Err(ConfigError::ZeroWorkers)
        ));
    }
}
