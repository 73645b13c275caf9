//! Scan orchestration
//!
//! A document is the unit of work: it is read, its links extracted and
//! validated, and its statistics and text output captured in a
//! [`DocumentReport`]. Reports are folded in submission order, so output and
//! counters do not depend on how many workers ran.
//!
//! Sequential mode shares one anchor cache across the whole run. Parallel
//! mode gives each rayon worker its own cache (`map_init`); nothing mutable
//! is shared while documents are being scanned.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::anchors::index::AnchorIndex;
use crate::backends::history::HistoryProbe;
use crate::core::config::RunConfig;
use crate::core::file_reader::read_document;
use crate::core::model::{DocumentReport, RunStatistics, ScanOutcome};
use crate::core::render::{document_lines, OutputFormat};
use crate::flows::links::extract_links;
use crate::flows::validate::LinkValidator;

/// Drives link validation over a list of documents
pub struct Scanner<'a> {
    config: &'a RunConfig,
    validator: LinkValidator<'a>,
    format: OutputFormat,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: &'a RunConfig,
        history: &'a dyn HistoryProbe,
        format: OutputFormat,
    ) -> Self {
        Self {
            config,
            validator: LinkValidator::new(config, history),
            format,
        }
    }

    /// Scan every document, sequentially or on `config.workers` threads
    pub fn run(&self, documents: &[PathBuf]) -> ScanOutcome {
        if self.config.workers > 1 {
            self.run_parallel(documents)
        } else {
            self.run_sequential(documents)
        }
    }

    /// Scan in listed order with one shared anchor cache
    pub fn run_sequential(&self, documents: &[PathBuf]) -> ScanOutcome {
        let mut index = AnchorIndex::new();
        let mut stats = RunStatistics::new();
        let mut reports = Vec::with_capacity(documents.len());

        for document in documents {
            let report = self.scan_document(&mut index, document);
            stats += report.stats;
            reports.push(report);
        }

        debug!("Sequential scan indexed {} document(s)", index.len());
        ScanOutcome { stats, reports }
    }

    /// Scan on a dedicated pool of `config.workers` threads
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self, documents: &[PathBuf]) -> ScanOutcome {
        use rayon::prelude::*;

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Could not start worker pool ({}), scanning sequentially", e);
                return self.run_sequential(documents);
            }
        };

        // Indexed collect keeps submission order regardless of completion order
        let reports: Vec<DocumentReport> = pool.install(|| {
            documents
                .par_iter()
                .map_init(AnchorIndex::new, |index, document| {
                    self.scan_document(index, document)
                })
                .collect()
        });

        ScanOutcome::from_reports(reports)
    }

    #[cfg(not(feature = "parallel"))]
    pub fn run_parallel(&self, documents: &[PathBuf]) -> ScanOutcome {
        warn!(
            "Built without the `parallel` feature; ignoring {} workers",
            self.config.workers
        );
        self.run_sequential(documents)
    }

    /// Scan one document end to end. Unreadable documents yield an empty
    /// report instead of an error.
    pub fn scan_document(&self, index: &mut AnchorIndex, document: &Path) -> DocumentReport {
        // Cache keys and anchor-only lookups need the canonical path
        let path = document
            .canonicalize()
            .unwrap_or_else(|_| document.to_path_buf());

        let mut report = DocumentReport {
            path: path.clone(),
            ..Default::default()
        };

        let Some(content) = read_document(&path) else {
            return report;
        };

        report.stats.files_scanned = 1;
        for link in extract_links(&content) {
            let check = self.validator.validate(index, &path, &link);
            report.stats.record(&check);
            report.checks.push(check);
        }

        if self.format == OutputFormat::Text {
            report.output = document_lines(&report, &self.config.docs_root, self.config.verbose);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::history::NoHistory;
    use crate::core::model::Verdict;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn corpus() -> (TempDir, PathBuf, Vec<PathBuf>) {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let mut docs = Vec::new();
        docs.push(write(
            &root,
            "index.md",
            concat!(
                "# Index\n\n",
                "[Guide](guide/db.md#25-troubleshooting)\n",
                "[Missing](gone.md)\n",
                "[Top](#index)\n",
            ),
        ));
        docs.push(write(
            &root,
            "guide/db.md",
            concat!(
                "# DB\n\n",
                "## 2.3 Prepared Statements (Parameterized Queries)\n",
                "## 2.5 Troubleshooting\n\n",
                "[back](../index.md) [site](https://example.com)\n",
            ),
        ));
        docs.push(write(
            &root,
            "guide/faq.md",
            concat!(
                "# FAQ\n\n",
                "[stmts](db.md#prepared-statements-parameterized-queries)\n",
                "[bad](db.md#nothing-here)\n",
                "[self](#nowhere)\n",
            ),
        ));
        for i in 0..12 {
            docs.push(write(
                &root,
                &format!("notes/note{:02}.md", i),
                &format!(
                    "# Note {}\n\n[idx](../index.md)\n[faq](../guide/faq.md#faq)\n{}",
                    i,
                    format_args!("[gone](../gone{}.md)\n", i)
                ),
            ));
        }
        docs.sort();
        (temp, root, docs)
    }

    #[test]
    fn test_sequential_counts() {
        let (_temp, root, docs) = corpus();
        let config = RunConfig::new(&root, None).unwrap();
        let scanner = Scanner::new(&config, &NoHistory, OutputFormat::Text);
        let outcome = scanner.run(&docs);

        assert_eq!(outcome.stats.files_scanned, 15);
        // index: 3, db: 2, faq: 3, notes: 12 * 3
        assert_eq!(outcome.stats.total_links, 44);
        // gone.md, #nowhere, 12 x gone{i}.md
        assert_eq!(outcome.stats.broken_links, 14);
        assert_eq!(outcome.stats.anchor_warnings, 1);
        assert_eq!(outcome.stats.skipped_urls, 1);
        assert_eq!(outcome.stats.valid_links, 30);
        assert!(outcome.has_broken_links());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (_temp, root, docs) = corpus();
        let sequential_config = RunConfig::new(&root, None).unwrap();
        let parallel_config = RunConfig::new(&root, None)
            .unwrap()
            .with_workers(4)
            .unwrap();

        let sequential =
            Scanner::new(&sequential_config, &NoHistory, OutputFormat::Text).run(&docs);
        let parallel =
            Scanner::new(&parallel_config, &NoHistory, OutputFormat::Text).run(&docs);

        assert_eq!(sequential.stats, parallel.stats);

        let seq_paths: Vec<_> = sequential.reports.iter().map(|r| &r.path).collect();
        let par_paths: Vec<_> = parallel.reports.iter().map(|r| &r.path).collect();
        assert_eq!(seq_paths, par_paths);

        let seq_output: Vec<_> = sequential.reports.iter().map(|r| &r.output).collect();
        let par_output: Vec<_> = parallel.reports.iter().map(|r| &r.output).collect();
        assert_eq!(seq_output, par_output);
    }

    /// Documents chained by anchor links, each also carrying many links the
    /// batch fix rewrites, so targets are edited while other workers index them
    fn fix_chain(root: &Path, documents: usize, fixable: usize) -> Vec<PathBuf> {
        (0..documents)
            .map(|i| {
                let mut content = String::from("# Chapter\n\n## Target\n\n");
                for _ in 0..fixable {
                    content.push_str("[x](old/x.md)\n");
                }
                content.push_str(&format!("[next](d{:03}.md#target)\n", (i + 1) % documents));
                write(root, &format!("d{:03}.md", i), &content)
            })
            .collect()
    }

    #[test]
    fn test_parallel_batch_fix_never_exposes_partial_documents() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let docs = fix_chain(&root, 32, 150);

        let config = RunConfig::new(&root, None)
            .unwrap()
            .with_workers(8)
            .unwrap()
            .with_fix(Some("old/:new/".parse().unwrap()));
        let outcome = Scanner::new(&config, &NoHistory, OutputFormat::Json).run(&docs);

        assert_eq!(outcome.stats.anchor_warnings, 0);
        assert_eq!(outcome.stats.broken_links, 0);
        assert_eq!(outcome.stats.fixed_links, 32 * 150);
        assert_eq!(outcome.stats.valid_links, 32 * 151);
        assert!(!fs::read_to_string(&docs[0]).unwrap().contains("old/x.md"));
    }

    #[test]
    fn test_unreadable_document_degrades_to_empty_report() {
        let (_temp, root, mut docs) = corpus();
        docs.push(root.join("vanished.md"));
        let config = RunConfig::new(&root, None).unwrap();
        let outcome = Scanner::new(&config, &NoHistory, OutputFormat::Json).run(&docs);

        assert_eq!(outcome.reports.len(), 16);
        assert_eq!(outcome.stats.files_scanned, 15);
        let last = outcome.reports.last().unwrap();
        assert!(last.checks.is_empty());
    }

    #[test]
    fn test_fenced_links_are_not_checked() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let doc = write(&root, "a.md", "# A\n```\n[x](missing.md)\n```\n");
        let config = RunConfig::new(&root, None).unwrap();
        let outcome = Scanner::new(&config, &NoHistory, OutputFormat::Text).run(&[doc]);
        assert_eq!(outcome.stats.total_links, 0);
    }

    #[test]
    fn test_anchor_only_uses_source_document() {
        let (_temp, root, docs) = corpus();
        let config = RunConfig::new(&root, None).unwrap();
        let outcome = Scanner::new(&config, &NoHistory, OutputFormat::Json).run(&docs);

        let verdict_of = |link: &str| {
            outcome
                .checks()
                .find(|c| c.link == link)
                .map(|c| c.verdict.clone())
                .unwrap()
        };
        assert_eq!(verdict_of("#index"), Verdict::InternalValid);
        assert!(matches!(verdict_of("#nowhere"), Verdict::Broken { .. }));
        assert_eq!(
            verdict_of("db.md#prepared-statements-parameterized-queries"),
            Verdict::InternalValid
        );
    }

    #[test]
    fn test_json_format_skips_text_capture() {
        let (_temp, root, docs) = corpus();
        let config = RunConfig::new(&root, None).unwrap();
        let outcome = Scanner::new(&config, &NoHistory, OutputFormat::Json).run(&docs);
        assert!(outcome.reports.iter().all(|r| r.output.is_empty()));
    }
}
