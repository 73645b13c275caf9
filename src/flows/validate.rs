//! Link validation
//!
//! Each link occurrence walks a fixed sequence of checks:
//! scheme -> depth -> anchor-only -> split -> batch fix -> resolve ->
//! existence (auto-TODO) -> anchor. Verdicts are data; nothing here fails
//! the run.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

use crate::anchors::index::AnchorIndex;
use crate::anchors::resolve::anchor_exists;
use crate::backends::history::{HistoryLookup, HistoryProbe};
use crate::core::config::RunConfig;
use crate::core::model::{BrokenReason, LinkCheck, Verdict};
use crate::core::paths::{is_internal, parent_depth, resolve_link_path};
use crate::flows::links::Link;
use crate::flows::mutate::{mark_todo, rewrite_link_target};

/// Schemes that are classified as external and never dereferenced
static EXTERNAL_SCHEME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:https?|ftp)://|mailto:)").expect("Invalid EXTERNAL_SCHEME_RE regex")
});

/// Whether a raw link uses a skipped URL scheme
pub fn is_external_scheme(raw_link: &str) -> bool {
    EXTERNAL_SCHEME_RE.is_match(raw_link)
}

/// Split `path#anchor` into the file part and a non-empty anchor
pub fn split_link(raw_link: &str) -> (&str, Option<&str>) {
    match raw_link.split_once('#') {
        Some((file, anchor)) if !anchor.is_empty() => (file, Some(anchor)),
        Some((file, _)) => (file, None),
        None => (raw_link, None),
    }
}

/// Validates link occurrences against the filesystem and anchor index
pub struct LinkValidator<'a> {
    config: &'a RunConfig,
    history: &'a dyn HistoryProbe,
}

impl<'a> LinkValidator<'a> {
    pub fn new(config: &'a RunConfig, history: &'a dyn HistoryProbe) -> Self {
        Self { config, history }
    }

    /// Validate one link found in `source` (an absolute path)
    pub fn validate(&self, index: &mut AnchorIndex, source: &Path, link: &Link) -> LinkCheck {
        let raw = link.target.as_str();
        let check = |verdict, deep| LinkCheck {
            file: source.to_path_buf(),
            line: link.line,
            link: raw.to_string(),
            verdict,
            deep,
        };

        if is_external_scheme(raw) {
            return check(Verdict::ExternalValid { skipped: true }, None);
        }

        let depth = parent_depth(raw);
        let deep = (self.config.warn_deep && depth > self.config.max_depth).then_some(depth);

        if raw.starts_with('#') {
            let verdict = if anchor_exists(index, source, raw) {
                Verdict::InternalValid
            } else {
                Verdict::Broken {
                    reason: BrokenReason::AnchorNotFound,
                    internal: true,
                }
            };
            return check(verdict, deep);
        }

        let (file_part, anchor) = split_link(raw);

        if let Some(verdict) = self.try_batch_fix(source, link) {
            return check(verdict, deep);
        }

        let target = resolve_link_path(source, file_part, &self.config.docs_root);
        let internal = is_internal(&target, &self.config.area_root);

        if !target.exists() {
            if self.config.auto_todo {
                if let Some(marker) = self.try_mark_todo(source, link, file_part) {
                    return check(Verdict::TodoMarked { marker, internal }, deep);
                }
            }
            let verdict = Verdict::Broken {
                reason: BrokenReason::FileNotFound,
                internal,
            };
            return check(verdict, deep);
        }

        if let Some(anchor) = anchor {
            if !anchor_exists(index, &target, anchor) {
                let verdict = Verdict::AnchorWarning {
                    internal,
                    anchor: anchor.to_string(),
                };
                return check(verdict, deep);
            }
        }

        let verdict = if internal {
            Verdict::InternalValid
        } else {
            Verdict::ExternalValid { skipped: false }
        };
        check(verdict, deep)
    }

    /// Apply the configured fix pattern. The rewritten target is not
    /// re-validated; a failed edit falls through to normal validation.
    fn try_batch_fix(&self, source: &Path, link: &Link) -> Option<Verdict> {
        let fix = self.config.fix.as_ref()?;
        if !fix.matches(&link.target) {
            return None;
        }

        let replacement = fix.apply(&link.target);
        match rewrite_link_target(source, link.line, &link.markup, &link.target, &replacement) {
            Ok(()) => {
                let (new_file, _) = split_link(&replacement);
                let target = resolve_link_path(source, new_file, &self.config.docs_root);
                Some(Verdict::Fixed {
                    internal: is_internal(&target, &self.config.area_root),
                    replacement,
                })
            }
            Err(e) => {
                warn!("Batch fix not applied: {:#}", e);
                None
            }
        }
    }

    /// Replace a dead link with a TODO marker unless history suggests the
    /// target was moved. Returns the marker when the document was edited.
    fn try_mark_todo(&self, source: &Path, link: &Link, file_part: &str) -> Option<String> {
        let base_name = Path::new(file_part).file_name()?.to_string_lossy().into_owned();

        match self.history.lookup(&base_name) {
            HistoryLookup::NotFound => {}
            HistoryLookup::Found => {
                debug!("{} has history, presumed moved; not marking TODO", base_name);
                return None;
            }
            HistoryLookup::Unavailable => {
                debug!("No history available; not marking TODO for {}", base_name);
                return None;
            }
        }

        match mark_todo(source, link.line, &link.markup, &link.text, &base_name) {
            Ok(marker) => Some(marker),
            Err(e) => {
                warn!("TODO marker not applied: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::history::NoHistory;
    use crate::core::config::FixPattern;
    use crate::flows::links::extract_line_links;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct FixedHistory(HistoryLookup);

    impl HistoryProbe for FixedHistory {
        fn lookup(&self, _base_name: &str) -> HistoryLookup {
            self.0
        }
    }

    /// docs/
    ///   guide/intro.md   (links live here)
    ///   guide/db.md      (## 2.5 Troubleshooting)
    ///   api.md
    fn corpus() -> (TempDir, RunConfig, PathBuf) {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("docs/guide")).unwrap();
        fs::write(
            root.join("docs/guide/db.md"),
            "# Database\n\n## 2.5 Troubleshooting\n",
        )
        .unwrap();
        fs::write(root.join("docs/api.md"), "# API\n").unwrap();
        fs::write(root.join("outside.md"), "# Outside\n").unwrap();
        let intro = root.join("docs/guide/intro.md");
        fs::write(&intro, "# Intro\n").unwrap();

        let config = RunConfig::new(&root.join("docs"), None).unwrap();
        (temp, config, intro)
    }

    fn link(target: &str) -> Link {
        let line = format!("[t]({})", target);
        extract_line_links(&line, 1).remove(0)
    }

    fn setup_link() -> Link {
        extract_line_links("[Setup](setup.md)", 1).remove(0)
    }

    fn run(config: &RunConfig, source: &Path, target: &str) -> LinkCheck {
        let validator = LinkValidator::new(config, &NoHistory);
        validator.validate(&mut AnchorIndex::new(), source, &link(target))
    }

    #[test]
    fn test_external_schemes_skipped() {
        let (_temp, config, intro) = corpus();
        for url in [
            "http://example.com/../../../x",
            "https://example.com",
            "ftp://files.example.com/a",
            "mailto:someone@example.com",
        ] {
            let result = run(&config, &intro, url);
            assert_eq!(result.verdict, Verdict::ExternalValid { skipped: true });
            assert_eq!(result.deep, None);
        }
    }

    #[test]
    fn test_split_link() {
        assert_eq!(split_link("a.md#b"), ("a.md", Some("b")));
        assert_eq!(split_link("a.md#"), ("a.md", None));
        assert_eq!(split_link("a.md"), ("a.md", None));
        assert_eq!(split_link("#b"), ("", Some("b")));
    }

    #[test]
    fn test_anchor_only_on_source() {
        let (_temp, config, intro) = corpus();
        assert_eq!(run(&config, &intro, "#intro").verdict, Verdict::InternalValid);
        assert_eq!(
            run(&config, &intro, "#missing").verdict,
            Verdict::Broken {
                reason: BrokenReason::AnchorNotFound,
                internal: true
            }
        );
    }

    #[test]
    fn test_relative_file_and_anchor() {
        let (_temp, config, intro) = corpus();
        assert_eq!(run(&config, &intro, "db.md").verdict, Verdict::InternalValid);
        assert_eq!(
            run(&config, &intro, "db.md#25-troubleshooting").verdict,
            Verdict::InternalValid
        );
        assert_eq!(run(&config, &intro, "../api.md#api").verdict, Verdict::InternalValid);
    }

    #[test]
    fn test_root_relative_link() {
        let (_temp, config, intro) = corpus();
        assert_eq!(
            run(&config, &intro, "/guide/db.md").verdict,
            Verdict::InternalValid
        );
    }

    #[test]
    fn test_missing_anchor_in_target_is_warning() {
        let (_temp, config, intro) = corpus();
        assert_eq!(
            run(&config, &intro, "db.md#installation").verdict,
            Verdict::AnchorWarning {
                internal: true,
                anchor: "installation".to_string()
            }
        );
    }

    #[test]
    fn test_missing_file_is_broken() {
        let (_temp, config, intro) = corpus();
        assert_eq!(
            run(&config, &intro, "nope.md").verdict,
            Verdict::Broken {
                reason: BrokenReason::FileNotFound,
                internal: true
            }
        );
    }

    #[test]
    fn test_target_outside_area_root_is_external() {
        let (_temp, config, intro) = corpus();
        assert_eq!(
            run(&config, &intro, "../../outside.md").verdict,
            Verdict::ExternalValid { skipped: false }
        );
        assert_eq!(
            run(&config, &intro, "../../gone.md").verdict,
            Verdict::Broken {
                reason: BrokenReason::FileNotFound,
                internal: false
            }
        );
    }

    #[test]
    fn test_deep_path_warning() {
        let (_temp, config, intro) = corpus();
        let config = config.with_deep_paths(true, 1);
        let result = run(&config, &intro, "../../outside.md");
        assert_eq!(result.deep, Some(2));
        assert!(result.verdict.is_valid());

        assert_eq!(run(&config, &intro, "../api.md").deep, None);
    }

    #[test]
    fn test_deep_path_disabled_by_default() {
        let (_temp, config, intro) = corpus();
        assert_eq!(run(&config, &intro, "../../../../x.md").deep, None);
    }

    #[test]
    fn test_batch_fix_rewrites_without_revalidating() {
        let (_temp, config, intro) = corpus();
        fs::write(&intro, "# Intro\nSee [file](../old/path/FILE.md) here.\n").unwrap();
        let fix: FixPattern = "old/path/:new/path/".parse().unwrap();
        let config = config.with_fix(Some(fix));

        let validator = LinkValidator::new(&config, &NoHistory);
        let found = extract_line_links("See [file](../old/path/FILE.md) here.", 2).remove(0);
        let result = validator.validate(&mut AnchorIndex::new(), &intro, &found);

        assert_eq!(
            result.verdict,
            Verdict::Fixed {
                replacement: "../new/path/FILE.md".to_string(),
                internal: true
            }
        );
        assert_eq!(
            fs::read_to_string(&intro).unwrap(),
            "# Intro\nSee [file](../new/path/FILE.md) here.\n"
        );
    }

    #[test]
    fn test_batch_fix_failure_falls_through() {
        let (_temp, config, intro) = corpus();
        // The occurrence is not on line 1 of the file, so the edit fails
        let fix: FixPattern = "db:api".parse().unwrap();
        let config = config.with_fix(Some(fix));
        let result = run(&config, &intro, "db.md");
        assert_eq!(result.verdict, Verdict::InternalValid);
    }

    #[test]
    fn test_auto_todo_marks_when_no_history() {
        let (_temp, config, intro) = corpus();
        fs::write(&intro, "[Setup](setup.md)\n").unwrap();
        let config = config.with_auto_todo(true);
        let history = FixedHistory(HistoryLookup::NotFound);

        let validator = LinkValidator::new(&config, &history);
        let result = validator.validate(&mut AnchorIndex::new(), &intro, &setup_link());

        assert_eq!(
            result.verdict,
            Verdict::TodoMarked {
                marker: "Setup (TODO: setup.md)".to_string(),
                internal: true
            }
        );
        assert!(fs::read_to_string(&intro).unwrap().contains("TODO: setup.md"));
    }

    #[test]
    fn test_auto_todo_skipped_when_history_found() {
        let (_temp, config, intro) = corpus();
        fs::write(&intro, "[Setup](setup.md)\n").unwrap();
        let config = config.with_auto_todo(true);
        let history = FixedHistory(HistoryLookup::Found);

        let validator = LinkValidator::new(&config, &history);
        let result = validator.validate(&mut AnchorIndex::new(), &intro, &setup_link());

        assert!(matches!(result.verdict, Verdict::Broken { .. }));
        assert_eq!(fs::read_to_string(&intro).unwrap(), "[Setup](setup.md)\n");
    }

    #[test]
    fn test_auto_todo_without_history_access_stays_broken() {
        let (_temp, config, intro) = corpus();
        fs::write(&intro, "[Setup](setup.md)\n").unwrap();
        let config = config.with_auto_todo(true);
        let validator = LinkValidator::new(&config, &NoHistory);
        let result = validator.validate(&mut AnchorIndex::new(), &intro, &setup_link());
        assert!(matches!(result.verdict, Verdict::Broken { .. }));
        assert_eq!(fs::read_to_string(&intro).unwrap(), "[Setup](setup.md)\n");
    }
}
