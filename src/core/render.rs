//! Renderer module
//!
//! Renders a ScanOutcome as human-readable text or a single JSON object.

use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::core::model::{DocumentReport, LinkCheck, RunStatistics, ScanOutcome, Verdict};
use crate::core::paths::display_path;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Summary block of the JSON report
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub stats: RunStatistics,
    pub success_rate: f64,
}

/// A broken link or anchor warning entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRecord {
    pub file: String,
    pub line: usize,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A deep relative path entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeepPathRecord {
    pub file: String,
    pub line: usize,
    pub link: String,
    pub depth: usize,
}

/// The complete JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub summary: Summary,
    pub broken_links: Vec<IssueRecord>,
    pub warnings: Vec<IssueRecord>,
    pub deep_paths: Vec<DeepPathRecord>,
}

impl JsonReport {
    pub fn from_outcome(outcome: &ScanOutcome, root: &Path) -> Self {
        let mut broken_links = Vec::new();
        let mut warnings = Vec::new();
        let mut deep_paths = Vec::new();

        for check in outcome.checks() {
            let file = display_path(&check.file, root);

            match &check.verdict {
                Verdict::Broken { reason, .. } => broken_links.push(IssueRecord {
                    file: file.clone(),
                    line: check.line,
                    link: check.link.clone(),
                    kind: reason.as_str().to_string(),
                }),
                Verdict::AnchorWarning { .. } => warnings.push(IssueRecord {
                    file: file.clone(),
                    line: check.line,
                    link: check.link.clone(),
                    kind: "anchor_not_found".to_string(),
                }),
                _ => {}
            }

            if let Some(depth) = check.deep {
                deep_paths.push(DeepPathRecord {
                    file,
                    line: check.line,
                    link: check.link.clone(),
                    depth,
                });
            }
        }

        Self {
            summary: Summary {
                stats: outcome.stats,
                success_rate: outcome.stats.success_rate(),
            },
            broken_links,
            warnings,
            deep_paths,
        }
    }
}

/// Render one link check as a text line, or `None` when it is not shown
fn render_check(check: &LinkCheck, root: &Path, verbose: bool) -> Option<String> {
    let location = format!("{}:{}", display_path(&check.file, root), check.line);

    let line = match &check.verdict {
        Verdict::Broken { reason, .. } => format!(
            "  {} {} → {} ({})",
            "✗ BROKEN".red().bold(),
            location,
            check.link,
            reason.as_str()
        ),
        Verdict::AnchorWarning { anchor, .. } => format!(
            "  {} {} → {} (#{} not found)",
            "⚠ ANCHOR".yellow().bold(),
            location,
            check.link,
            anchor
        ),
        Verdict::Fixed { replacement, .. } => format!(
            "  {} {} → {} => {}",
            "✎ FIXED ".green(),
            location,
            check.link,
            replacement
        ),
        Verdict::TodoMarked { marker, .. } => format!(
            "  {} {} → {} => \"{}\"",
            "✎ TODO  ".green(),
            location,
            check.link,
            marker
        ),
        Verdict::ExternalValid { skipped: true } if verbose => {
            format!("  {} {} → {}", "○ SKIP  ".dimmed(), location, check.link)
        }
        Verdict::InternalValid | Verdict::ExternalValid { .. } if verbose => {
            format!("  {} {} → {}", "✓ OK    ".green(), location, check.link)
        }
        _ => return None,
    };

    Some(line)
}

/// Render the text lines for one document: a header followed by verdicts.
/// Quiet documents produce no lines unless `verbose` is set.
pub fn document_lines(report: &DocumentReport, root: &Path, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();

    for check in &report.checks {
        if let Some(line) = render_check(check, root, verbose) {
            lines.push(line);
        }
        if let Some(depth) = check.deep {
            lines.push(format!(
                "  {} {}:{} → {} ({} levels up)",
                "↳ DEEP  ".cyan(),
                display_path(&check.file, root),
                check.line,
                check.link,
                depth
            ));
        }
    }

    if !lines.is_empty() || verbose {
        lines.insert(0, display_path(&report.path, root).bold().to_string());
    }
    lines
}

/// Render the closing summary block
pub fn render_summary(stats: &RunStatistics) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", "Summary".bold()));
    output.push_str(&format!("  Documents scanned: {}\n", stats.files_scanned));
    output.push_str(&format!(
        "  Links found:       {} (internal {}, external {})\n",
        stats.total_links, stats.internal_links, stats.external_links
    ));
    output.push_str(&format!("  Valid:             {}\n", stats.valid_links));

    let broken = format!(
        "  Broken:            {} (internal {}, external {})",
        stats.broken_links, stats.internal_broken, stats.external_broken
    );
    if stats.broken_links > 0 {
        output.push_str(&format!("{}\n", broken.red()));
    } else {
        output.push_str(&format!("{}\n", broken));
    }

    output.push_str(&format!("  Anchor warnings:   {}\n", stats.anchor_warnings));
    output.push_str(&format!("  Skipped URLs:      {}\n", stats.skipped_urls));
    output.push_str(&format!("  Deep paths:        {}\n", stats.deep_paths));
    output.push_str(&format!(
        "  Auto-fixed:        {} (batch {}, todo {})\n",
        stats.fixed_links + stats.todo_marked,
        stats.fixed_links,
        stats.todo_marked
    ));
    output.push_str(&format!("  Success rate:      {:.1}%", stats.success_rate()));

    output
}

/// Renderer for scan outcomes
pub struct Renderer<'a> {
    format: OutputFormat,
    root: &'a Path,
}

impl<'a> Renderer<'a> {
    pub fn new(format: OutputFormat, root: &'a Path) -> Self {
        Self { format, root }
    }

    /// Render a scan outcome to a string
    pub fn render(&self, outcome: &ScanOutcome) -> String {
        match self.format {
            OutputFormat::Text => self.render_text(outcome),
            OutputFormat::Json => self.render_json(outcome),
        }
    }

    /// Replay captured per-document output in submission order, then summarize
    fn render_text(&self, outcome: &ScanOutcome) -> String {
        let mut output = String::new();
        for report in &outcome.reports {
            for line in &report.output {
                output.push_str(line);
                output.push('\n');
            }
        }
        output.push_str(&render_summary(&outcome.stats));
        output
    }

    fn render_json(&self, outcome: &ScanOutcome) -> String {
        let report = JsonReport::from_outcome(outcome, self.root);
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }
}
