//! Link Result Model
//!
//! Every link occurrence found while scanning ends up as a [`LinkCheck`]
//! carrying a [`Verdict`]. Per-document results are folded into
//! [`RunStatistics`], which is merged by plain addition after all workers
//! have finished.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::PathBuf;

/// Why a link is considered broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokenReason {
    /// The target file does not exist
    FileNotFound,
    /// A same-document `#anchor` link points at a missing section
    AnchorNotFound,
}

impl BrokenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrokenReason::FileNotFound => "file_not_found",
            BrokenReason::AnchorNotFound => "anchor_not_found",
        }
    }
}

/// Outcome of validating a single link occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Target is inside the area root and resolves
    InternalValid,
    /// Target resolves but lies outside the area root, or is a URL scheme
    /// that is never dereferenced (`skipped`)
    ExternalValid { skipped: bool },
    /// Target file exists but the requested anchor does not
    AnchorWarning { internal: bool, anchor: String },
    /// Link cannot be resolved
    Broken {
        reason: BrokenReason,
        internal: bool,
    },
    /// The batch-fix pattern rewrote this occurrence
    Fixed { replacement: String, internal: bool },
    /// The dead link was replaced by a TODO marker
    TodoMarked { marker: String, internal: bool },
}

impl Verdict {
    /// Whether the link counts toward the valid total
    pub fn is_valid(&self) -> bool {
        !matches!(self, Verdict::Broken { .. })
    }

    /// Whether the resolved target lies inside the area root
    pub fn is_internal(&self) -> bool {
        match self {
            Verdict::InternalValid => true,
            Verdict::ExternalValid { .. } => false,
            Verdict::AnchorWarning { internal, .. }
            | Verdict::Broken { internal, .. }
            | Verdict::Fixed { internal, .. }
            | Verdict::TodoMarked { internal, .. } => *internal,
        }
    }
}

/// A validated link occurrence
#[derive(Debug, Clone)]
pub struct LinkCheck {
    /// Source document (absolute)
    pub file: PathBuf,
    /// 1-indexed line number
    pub line: usize,
    /// Raw link target as written in the document
    pub link: String,
    pub verdict: Verdict,
    /// Number of `../` segments when the link exceeded the deep-path threshold
    pub deep: Option<usize>,
}

/// Aggregate counters for one validation run (or one document)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub files_scanned: usize,
    pub total_links: usize,
    pub valid_links: usize,
    pub broken_links: usize,
    pub anchor_warnings: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub internal_broken: usize,
    pub external_broken: usize,
    pub skipped_urls: usize,
    pub deep_paths: usize,
    pub fixed_links: usize,
    pub todo_marked: usize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one validated link
    pub fn record(&mut self, check: &LinkCheck) {
        self.total_links += 1;

        let internal = check.verdict.is_internal();
        if internal {
            self.internal_links += 1;
        } else {
            self.external_links += 1;
        }

        if check.verdict.is_valid() {
            self.valid_links += 1;
        }

        match &check.verdict {
            Verdict::Broken { .. } => {
                self.broken_links += 1;
                if internal {
                    self.internal_broken += 1;
                } else {
                    self.external_broken += 1;
                }
            }
            Verdict::AnchorWarning { .. } => self.anchor_warnings += 1,
            Verdict::ExternalValid { skipped: true } => self.skipped_urls += 1,
            Verdict::Fixed { .. } => self.fixed_links += 1,
            Verdict::TodoMarked { .. } => self.todo_marked += 1,
            Verdict::InternalValid | Verdict::ExternalValid { .. } => {}
        }

        if check.deep.is_some() {
            self.deep_paths += 1;
        }
    }

    /// Percentage of valid links (100 when no links were found)
    pub fn success_rate(&self) -> f64 {
        if self.total_links == 0 {
            return 100.0;
        }
        self.valid_links as f64 * 100.0 / self.total_links as f64
    }
}

impl AddAssign for RunStatistics {
    fn add_assign(&mut self, other: Self) {
        self.files_scanned += other.files_scanned;
        self.total_links += other.total_links;
        self.valid_links += other.valid_links;
        self.broken_links += other.broken_links;
        self.anchor_warnings += other.anchor_warnings;
        self.internal_links += other.internal_links;
        self.external_links += other.external_links;
        self.internal_broken += other.internal_broken;
        self.external_broken += other.external_broken;
        self.skipped_urls += other.skipped_urls;
        self.deep_paths += other.deep_paths;
        self.fixed_links += other.fixed_links;
        self.todo_marked += other.todo_marked;
    }
}

/// Everything one worker produced for one document
#[derive(Debug, Clone, Default)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub stats: RunStatistics,
    pub checks: Vec<LinkCheck>,
    /// Pre-rendered text output, replayed in submission order
    pub output: Vec<String>,
}

/// Aggregated result of a whole run, reports in submission order
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub stats: RunStatistics,
    pub reports: Vec<DocumentReport>,
}

impl ScanOutcome {
    /// Fold per-document reports in order; counters are plain sums
    pub fn from_reports(reports: Vec<DocumentReport>) -> Self {
        let mut stats = RunStatistics::new();
        for report in &reports {
            stats += report.stats;
        }
        Self { stats, reports }
    }

    /// Every link check, in document then line order
    pub fn checks(&self) -> impl Iterator<Item = &LinkCheck> {
        self.reports.iter().flat_map(|r| r.checks.iter())
    }

    pub fn has_broken_links(&self) -> bool {
        self.stats.broken_links > 0
    }
}
